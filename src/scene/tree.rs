//! Static tree geometry: trunk, branches, leaf clusters, and ground

use serde::{Serialize, Deserialize};
use crate::math::{Vec3, Mat4};
use crate::mesh::{Mesh, Material, Color};
use crate::mesh::primitives::{cylinder, sphere, plane};
use super::part::ScenePart;

/// A branch grows from `base` along its local +Y, then is rotated by the
/// XYZ Euler angles in `rotation`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchSpec {
    pub base: Vec3,
    pub rotation: Vec3,
    pub length: f32,
}

impl BranchSpec {
    pub const fn new(base: [f32; 3], rotation: [f32; 3], length: f32) -> Self {
        Self {
            base: Vec3::new(base[0], base[1], base[2]),
            rotation: Vec3::new(rotation[0], rotation[1], rotation[2]),
            length,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeafCluster {
    pub center: Vec3,
    pub radius: f32,
}

impl LeafCluster {
    pub const fn new(x: f32, y: f32, z: f32, radius: f32) -> Self {
        Self { center: Vec3::new(x, y, z), radius }
    }
}

const DEFAULT_BRANCHES: [BranchSpec; 8] = [
    BranchSpec::new([0.0, 7.0, 0.0], [0.0, 0.0, 0.4], 5.0),
    BranchSpec::new([0.0, 6.0, 0.0], [0.0, 1.2, -0.45], 4.5),
    BranchSpec::new([0.0, 5.0, 0.0], [0.0, 2.5, 0.4], 4.0),
    BranchSpec::new([0.0, 7.5, 0.0], [0.0, 3.8, -0.35], 4.5),
    BranchSpec::new([0.0, 5.5, 0.0], [0.0, 5.0, 0.3], 3.8),
    BranchSpec::new([0.0, 8.0, 0.0], [0.0, 0.6, -0.25], 3.5),
    BranchSpec::new([0.0, 6.5, 0.0], [0.0, 4.2, 0.5], 4.0),
    BranchSpec::new([0.0, 7.8, 0.0], [0.0, 2.0, 0.15], 3.0),
];

const DEFAULT_LEAF_CLUSTERS: [LeafCluster; 16] = [
    // crown
    LeafCluster::new(0.0, 13.0, 0.0, 3.0),
    LeafCluster::new(0.0, 11.0, 0.0, 3.5),
    // upper ring
    LeafCluster::new(2.5, 12.0, 1.0, 2.5),
    LeafCluster::new(-2.5, 12.0, -1.0, 2.5),
    LeafCluster::new(1.0, 11.0, -2.5, 2.5),
    LeafCluster::new(-1.0, 11.0, 2.5, 2.5),
    // lower ring
    LeafCluster::new(3.5, 10.0, 0.0, 2.2),
    LeafCluster::new(-3.5, 10.0, 0.0, 2.2),
    LeafCluster::new(0.0, 10.0, 3.5, 2.2),
    LeafCluster::new(0.0, 10.0, -3.5, 2.2),
    LeafCluster::new(2.5, 9.5, 2.5, 2.0),
    LeafCluster::new(-2.5, 9.5, -2.5, 2.0),
    LeafCluster::new(2.5, 9.5, -2.5, 2.0),
    LeafCluster::new(-2.5, 9.5, 2.5, 2.0),
    // gap fillers
    LeafCluster::new(1.5, 13.5, -1.0, 2.0),
    LeafCluster::new(-1.5, 13.5, 1.0, 2.0),
];

/// Dimensions and materials of the static scenery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub trunk_radius_top: f32,
    pub trunk_radius_bottom: f32,
    pub trunk_height: f32,
    pub trunk_segments: usize,
    pub trunk_material: Material,
    pub trunk_cast_shadow: bool,

    pub branch_radius_tip: f32,
    pub branch_radius_base: f32,
    pub branch_segments: usize,
    pub branch_material: Material,
    pub branches: Vec<BranchSpec>,
    pub branch_cast_shadow: bool,

    pub leaf_segments: usize,
    pub leaf_material: Material,
    pub leaf_clusters: Vec<LeafCluster>,
    pub leaf_cast_shadow: bool,

    pub ground_size: f32,
    pub ground_material: Material,
    pub ground_receive_shadow: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            trunk_radius_top: 0.6,
            trunk_radius_bottom: 1.0,
            trunk_height: 8.0,
            trunk_segments: 12,
            trunk_material: Material::matte(Color::from_hex(0x8B4513)),
            trunk_cast_shadow: true,

            branch_radius_tip: 0.08,
            branch_radius_base: 0.2,
            branch_segments: 8,
            branch_material: Material::matte(Color::from_hex(0x6B3410)),
            branches: DEFAULT_BRANCHES.to_vec(),
            branch_cast_shadow: true,

            leaf_segments: 10,
            leaf_material: Material::translucent(Color::from_hex(0x228B22), 0.82),
            leaf_clusters: DEFAULT_LEAF_CLUSTERS.to_vec(),
            leaf_cast_shadow: false,

            ground_size: 60.0,
            ground_material: Material::matte(Color::from_hex(0x7CCD7C)),
            ground_receive_shadow: true,
        }
    }
}

/// Static geometry, one part per shadow and blending treatment
#[derive(Debug, Clone, Default)]
pub struct TreeGeometry {
    pub ground: ScenePart,
    pub trunk: ScenePart,
    pub branches: ScenePart,
    pub foliage: ScenePart,
}

impl TreeGeometry {
    pub fn into_parts(self) -> Vec<ScenePart> {
        vec![self.ground, self.trunk, self.branches, self.foliage]
    }
}

pub struct TreeBuilder<'a> {
    config: &'a TreeConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a TreeConfig) -> Self {
        Self { config }
    }

    /// Trunk standing on the ground plane
    pub fn trunk(&self) -> Mesh {
        let c = self.config;
        cylinder(
            c.trunk_radius_top,
            c.trunk_radius_bottom,
            c.trunk_height,
            c.trunk_segments,
            &c.trunk_material,
        )
        .transformed(&Mat4::translation(Vec3::new(0.0, c.trunk_height / 2.0, 0.0)))
    }

    /// A single branch, pivoting at its base
    pub fn branch(&self, spec: &BranchSpec) -> Mesh {
        let c = self.config;
        let local = Mat4::translation(Vec3::new(0.0, spec.length / 2.0, 0.0));
        let placement = Mat4::from_position_rotation(spec.base, spec.rotation);
        cylinder(
            c.branch_radius_tip,
            c.branch_radius_base,
            spec.length,
            c.branch_segments,
            &c.branch_material,
        )
        .transformed(&placement.mul(&local))
    }

    pub fn branches(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for spec in &self.config.branches {
            mesh.merge(&self.branch(spec));
        }
        mesh
    }

    pub fn foliage(&self) -> Mesh {
        let c = self.config;
        let mut mesh = Mesh::new();
        for cluster in &c.leaf_clusters {
            let ball = sphere(cluster.radius, c.leaf_segments, c.leaf_segments, &c.leaf_material)
                .transformed(&Mat4::translation(cluster.center));
            mesh.merge(&ball);
        }
        mesh
    }

    pub fn ground(&self) -> Mesh {
        let c = self.config;
        plane(c.ground_size, c.ground_size, &c.ground_material)
    }

    pub fn build(&self) -> TreeGeometry {
        let c = self.config;
        TreeGeometry {
            ground: ScenePart::with_materials(self.ground(), [&c.ground_material])
                .receiving(c.ground_receive_shadow),
            trunk: ScenePart::with_materials(self.trunk(), [&c.trunk_material])
                .casting(c.trunk_cast_shadow),
            branches: ScenePart::with_materials(self.branches(), [&c.branch_material])
                .casting(c.branch_cast_shadow),
            foliage: ScenePart::with_materials(self.foliage(), [&c.leaf_material])
                .casting(c.leaf_cast_shadow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_stands_on_ground() {
        let config = TreeConfig::default();
        let trunk = TreeBuilder::new(&config).trunk();
        let min_y = trunk.vertices.iter().map(|v| v.position.y).fold(f32::MAX, f32::min);
        let max_y = trunk.vertices.iter().map(|v| v.position.y).fold(f32::MIN, f32::max);
        assert!(min_y.abs() < 1e-4);
        assert!((max_y - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_branch_pivots_at_base() {
        let config = TreeConfig::default();
        let spec = config.branches[0];
        let branch = TreeBuilder::new(&config).branch(&spec);

        // The base cap center is the first vertex after both rings and the top cap
        let segments = config.branch_segments;
        let base_center = branch.vertices[2 * segments + segments + 1].position;
        assert!(base_center.distance(&spec.base) < 1e-4);

        // Rotation about Z by +0.4 leans the tip toward -X
        let tip_center = branch.vertices[2 * segments].position;
        assert!(tip_center.x < 0.0);
        assert!((tip_center.distance(&spec.base) - spec.length).abs() < 1e-4);
    }

    #[test]
    fn test_default_counts() {
        let config = TreeConfig::default();
        assert_eq!(config.branches.len(), 8);
        assert_eq!(config.leaf_clusters.len(), 16);

        let builder = TreeBuilder::new(&config);
        let per_branch = 4 * config.branch_segments + 2;
        assert_eq!(builder.branches().vertex_count(), 8 * per_branch);
        assert_eq!(builder.foliage().vertex_count(), 16 * 11 * 11);
    }

    #[test]
    fn test_build_splits_passes() {
        let config = TreeConfig::default();
        let geometry = TreeBuilder::new(&config).build();
        assert!(geometry.trunk.mesh.vertices.iter().all(|v| v.opacity == 1.0));
        assert!(geometry.foliage.mesh.vertices.iter().all(|v| (v.opacity - 0.82).abs() < 1e-6));
        assert!(!geometry.ground.blended && !geometry.trunk.blended && !geometry.branches.blended);
        assert!(geometry.foliage.blended);
    }

    #[test]
    fn test_default_shadow_roles() {
        let config = TreeConfig::default();
        let geometry = TreeBuilder::new(&config).build();
        assert!(geometry.ground.receive_shadow && !geometry.ground.cast_shadow);
        assert!(geometry.trunk.cast_shadow && !geometry.trunk.receive_shadow);
        assert!(geometry.branches.cast_shadow);
        assert!(!geometry.foliage.cast_shadow);
    }

    #[test]
    fn test_translucent_trunk_is_blended() {
        let config = TreeConfig {
            trunk_material: Material::translucent(Color::from_hex(0x8B4513), 0.5),
            ..Default::default()
        };
        let geometry = TreeBuilder::new(&config).build();
        assert!(geometry.trunk.blended);
        assert!(!geometry.branches.blended);
    }

    #[test]
    fn test_empty_lists_build() {
        let config = TreeConfig {
            branches: vec![],
            leaf_clusters: vec![],
            ..Default::default()
        };
        let geometry = TreeBuilder::new(&config).build();
        assert!(geometry.foliage.is_empty());
        assert!(geometry.branches.is_empty());
        assert!(!geometry.trunk.is_empty());
        assert_eq!(geometry.into_parts().len(), 4);
    }
}
