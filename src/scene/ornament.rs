//! Apple ornament factory
//!
//! An ornament is a glossy body, a short stem, and a small tilted leaf. The
//! mesh is built around the body center, so placing an ornament is a single
//! translation to its canopy point.

use serde::{Serialize, Deserialize};
use crate::math::{Vec3, Mat4};
use crate::mesh::{Mesh, Material, Color};
use crate::mesh::primitives::{cylinder, ellipsoid};
use super::part::ScenePart;

/// Proportions and materials of one apple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrnamentConfig {
    pub body_radius: f32,
    /// Vertical squash of the body (1.0 is a perfect sphere)
    pub body_squash: f32,
    pub body_segments: usize,
    pub body_material: Material,
    /// Bodies darken the canopy below them; stem and leaf never cast
    pub body_cast_shadow: bool,

    pub stem_radius: f32,
    pub stem_height: f32,
    pub stem_segments: usize,
    /// Height of the stem center above the body center
    pub stem_offset: f32,
    pub stem_material: Material,

    pub leaf_radius: f32,
    pub leaf_flatten: f32,
    pub leaf_width_segments: usize,
    pub leaf_height_segments: usize,
    pub leaf_offset: Vec3,
    /// Rotation about Z, radians
    pub leaf_tilt: f32,
    pub leaf_material: Material,
}

impl Default for OrnamentConfig {
    fn default() -> Self {
        Self {
            body_radius: 0.35,
            body_squash: 0.9, // slight indent on top
            body_segments: 14,
            // Specular 0x66 against a 0xCC body
            body_material: Material::glossy(Color::from_hex(0xCC0000), 0.5),
            body_cast_shadow: true,

            stem_radius: 0.03,
            stem_height: 0.2,
            stem_segments: 6,
            stem_offset: 0.35,
            stem_material: Material::matte(Color::from_hex(0x5C3317)),

            leaf_radius: 0.08,
            leaf_flatten: 0.4,
            leaf_width_segments: 6,
            leaf_height_segments: 4,
            leaf_offset: Vec3::new(0.06, 0.38, 0.0),
            leaf_tilt: -0.5,
            leaf_material: Material::matte(Color::from_hex(0x32CD32)),
        }
    }
}

/// Stateless builder for ornament meshes
#[derive(Debug, Clone, Copy, Default)]
pub struct OrnamentFactory {
    config: OrnamentConfig,
}

impl OrnamentFactory {
    pub fn new(config: OrnamentConfig) -> Self {
        Self { config }
    }

    /// Apple body centered on the local origin
    pub fn body(&self) -> Mesh {
        let c = &self.config;
        ellipsoid(
            Vec3::new(c.body_radius, c.body_radius * c.body_squash, c.body_radius),
            c.body_segments,
            c.body_segments,
            &c.body_material,
        )
    }

    /// Stem and leaf
    pub fn trim(&self) -> Mesh {
        let c = &self.config;
        let mut mesh = cylinder(c.stem_radius, c.stem_radius, c.stem_height, c.stem_segments, &c.stem_material)
            .transformed(&Mat4::translation(Vec3::new(0.0, c.stem_offset, 0.0)));

        let leaf = ellipsoid(
            Vec3::new(c.leaf_radius, c.leaf_radius * c.leaf_flatten, c.leaf_radius),
            c.leaf_width_segments,
            c.leaf_height_segments,
            &c.leaf_material,
        )
        .transformed(&Mat4::from_position_rotation(c.leaf_offset, Vec3::new(0.0, 0.0, c.leaf_tilt)));
        mesh.merge(&leaf);
        mesh
    }

    /// Build one ornament centered on the local origin
    pub fn build(&self) -> Mesh {
        let mut mesh = self.body();
        mesh.merge(&self.trim());
        mesh
    }

    /// Build one ornament moved to `position`
    pub fn build_at(&self, position: Vec3) -> Mesh {
        self.build().transformed(&Mat4::translation(position))
    }

    /// One ornament per position, batched into a body part and a trim part
    ///
    /// No positions yields no parts.
    pub fn build_parts(&self, positions: &[Vec3]) -> Vec<ScenePart> {
        if positions.is_empty() {
            return Vec::new();
        }
        let c = &self.config;
        let bodies = batch(&self.body(), positions);
        let trims = batch(&self.trim(), positions);
        vec![
            ScenePart::with_materials(bodies, [&c.body_material]).casting(c.body_cast_shadow),
            ScenePart::with_materials(trims, [&c.stem_material, &c.leaf_material]),
        ]
    }
}

fn batch(template: &Mesh, positions: &[Vec3]) -> Mesh {
    let mut mesh = Mesh::new();
    for &p in positions {
        mesh.merge(&template.clone().transformed(&Mat4::translation(p)));
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_has_three_parts() {
        let cfg = OrnamentConfig::default();
        let mesh = OrnamentFactory::new(cfg).build();

        let body = 15 * 15;
        let stem = 4 * 6 + 2;
        let leaf = 7 * 5;
        assert_eq!(mesh.vertex_count(), body + stem + leaf);

        let red = cfg.body_material.color.to_array();
        let green = cfg.leaf_material.color.to_array();
        assert!(mesh.vertices.iter().any(|v| v.color == red));
        assert!(mesh.vertices.iter().any(|v| v.color == green));
    }

    #[test]
    fn test_body_is_squashed() {
        let mesh = OrnamentFactory::default().build();
        let body = &mesh.vertices[..15 * 15];
        let top = body.iter().map(|v| v.position.y).fold(f32::MIN, f32::max);
        let side = body.iter().map(|v| v.position.x.abs()).fold(f32::MIN, f32::max);
        assert!((top - 0.315).abs() < 1e-4);
        assert!((side - 0.35).abs() < 1e-3);
    }

    #[test]
    fn test_stem_sits_on_top() {
        let cfg = OrnamentConfig::default();
        let mesh = OrnamentFactory::new(cfg).build();
        let stem = &mesh.vertices[15 * 15..15 * 15 + 26];
        for v in stem {
            assert!(v.position.y >= 0.25 - 1e-5 && v.position.y <= 0.45 + 1e-5);
            assert_eq!(v.color, cfg.stem_material.color.to_array());
        }
    }

    #[test]
    fn test_build_at_translates() {
        let factory = OrnamentFactory::default();
        let origin = factory.build();
        let target = Vec3::new(1.0, 11.0, -2.0);
        let moved = factory.build_at(target);
        let shift = moved.centroid() - origin.centroid();
        assert!(shift.distance(&target) < 1e-4);
    }

    #[test]
    fn test_parts_scale_with_count() {
        let factory = OrnamentFactory::default();
        let single = factory.build();
        let positions = vec![Vec3::ZERO; 16];
        let parts = factory.build_parts(&positions);
        assert_eq!(parts.len(), 2);

        let vertices: usize = parts.iter().map(|p| p.mesh.vertex_count()).sum();
        let triangles: usize = parts.iter().map(|p| p.mesh.triangle_count()).sum();
        assert_eq!(vertices, single.vertex_count() * 16);
        assert_eq!(triangles, single.triangle_count() * 16);
        assert!(factory.build_parts(&[]).is_empty());
    }

    #[test]
    fn test_only_bodies_cast() {
        let parts = OrnamentFactory::default().build_parts(&[Vec3::new(0.0, 9.0, 0.0)]);
        assert_eq!(parts[0].mesh.vertex_count(), 15 * 15);
        assert!(parts[0].cast_shadow);
        assert!(!parts[1].cast_shadow);
        assert!(parts.iter().all(|p| !p.receive_shadow && !p.blended));

        let cfg = OrnamentConfig { body_cast_shadow: false, ..Default::default() };
        let parts = OrnamentFactory::new(cfg).build_parts(&[Vec3::ZERO]);
        assert!(!parts[0].cast_shadow);
    }

    #[test]
    fn test_body_is_glossy_and_rest_matte() {
        let mesh = OrnamentFactory::default().build();
        assert!(mesh.vertices[0].specular > 0.0);
        assert_eq!(mesh.vertices.last().map(|v| v.specular), Some(0.0));
    }
}
