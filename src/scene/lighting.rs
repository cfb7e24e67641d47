use serde::{Serialize, Deserialize};
use crate::math::{Vec3, Mat4};
use crate::mesh::Color;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Light arriving from `position` toward the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    /// Renders a shadow map from this light; only the key light honours it
    #[serde(default)]
    pub cast_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector from the surface toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize()
    }

    /// Color premultiplied by intensity, ready for a uniform
    pub fn radiance(&self) -> [f32; 3] {
        scaled(self.color, self.intensity)
    }
}

impl AmbientLight {
    pub fn radiance(&self) -> [f32; 3] {
        scaled(self.color, self.intensity)
    }
}

fn scaled(color: Color, intensity: f32) -> [f32; 3] {
    [color.r * intensity, color.g * intensity, color.b * intensity]
}

/// Depth map rendered from the key light
///
/// The light looks at `center` with an orthographic box of half-size
/// `radius`, so everything within `radius` of `center` lands in the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    /// Square depth texture edge in texels
    pub map_size: u32,
    pub center: Vec3,
    pub radius: f32,
    /// Depth offset against self-shadowing acne, in depth-buffer units
    pub bias: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 2048,
            center: Vec3::new(0.0, 7.0, 0.0), // between the trunk base and the crown
            radius: 14.0,
            bias: 0.0015,
        }
    }
}

impl ShadowConfig {
    /// World to light clip space for `light`
    pub fn light_space(&self, light: &DirectionalLight) -> Mat4 {
        let toward_light = light.direction();
        // A light straight overhead needs another up vector
        let up = if toward_light.cross(&Vec3::UP).length_squared() < 1e-6 {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::UP
        };

        let r = self.radius;
        let eye = self.center + toward_light.scale(2.0 * r);
        let view = Mat4::look_at(eye, self.center, up);
        Mat4::orthographic(-r, r, -r, r, 0.5 * r, 3.5 * r).mul(&view)
    }
}

/// Background, fog, and the three scene lights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub background: Color,
    pub fog_color: Color,
    /// Distance where fog starts
    pub fog_near: f32,
    /// Distance where fog is total
    pub fog_far: f32,
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    /// Warm highlight from the opposite side
    pub fill: DirectionalLight,
    /// Phong exponent for glossy surfaces
    pub shininess: f32,
    pub shadow: ShadowConfig,
}

impl Default for LightingConfig {
    fn default() -> Self {
        let sky = Color::from_hex(0x87CEEB);
        Self {
            background: sky,
            fog_color: sky,
            fog_near: 40.0,
            fog_far: 80.0,
            ambient: AmbientLight { color: Color::WHITE, intensity: 0.7 },
            key: DirectionalLight {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(8.0, 20.0, 10.0),
                cast_shadow: true,
            },
            fill: DirectionalLight {
                color: Color::from_hex(0xFFF0DD),
                intensity: 0.3,
                position: Vec3::new(-5.0, 8.0, -5.0),
                cast_shadow: false,
            },
            shininess: 100.0,
            shadow: ShadowConfig::default(),
        }
    }
}

impl LightingConfig {
    /// Fraction of fog mixed in at `distance`, linear between near and far
    pub fn fog_factor(&self, distance: f32) -> f32 {
        if self.fog_far <= self.fog_near {
            return if distance >= self.fog_far { 1.0 } else { 0.0 };
        }
        ((distance - self.fog_near) / (self.fog_far - self.fog_near)).clamp(0.0, 1.0)
    }

    /// Whether a shadow map is rendered at all
    pub fn shadows_enabled(&self) -> bool {
        self.shadow.enabled && self.key.cast_shadow
    }

    pub fn light_space(&self) -> Mat4 {
        self.shadow.light_space(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_factor_linear() {
        let lighting = LightingConfig::default();
        assert_eq!(lighting.fog_factor(10.0), 0.0);
        assert!((lighting.fog_factor(60.0) - 0.5).abs() < 1e-6);
        assert_eq!(lighting.fog_factor(200.0), 1.0);
    }

    #[test]
    fn test_key_light_points_up_and_out() {
        let dir = LightingConfig::default().key.direction();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y > 0.0);
    }

    fn in_clip_volume(p: Vec3) -> bool {
        p.x.abs() <= 1.0 && p.y.abs() <= 1.0 && p.z.abs() <= 1.0
    }

    #[test]
    fn test_light_space_covers_canopy_and_trunk() {
        let lighting = LightingConfig::default();
        let m = lighting.light_space();

        // Canopy bounding box corners around (0, 11, 0)
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    let corner = Vec3::new(5.8 * sx, 11.0 + 3.8 * sy, 5.8 * sz);
                    assert!(in_clip_volume(m.transform_point(corner)), "{:?} outside shadow map", corner);
                }
            }
        }
        // Trunk base, where its shadow starts
        for base in [Vec3::new(1.0, 0.0, 1.0), Vec3::new(-1.0, 0.0, -1.0)] {
            assert!(in_clip_volume(m.transform_point(base)));
        }
    }

    #[test]
    fn test_light_ray_maps_to_one_texel() {
        let lighting = LightingConfig::default();
        let m = lighting.light_space();
        let apple = Vec3::new(3.0, 10.0, 1.0);
        let on_ground = apple - lighting.key.direction().scale(10.0 / lighting.key.direction().y);

        let a = m.transform_point(apple);
        let g = m.transform_point(on_ground);
        assert!((a.x - g.x).abs() < 1e-4 && (a.y - g.y).abs() < 1e-4);
        // The ground is farther from the light
        assert!(g.z > a.z);
    }

    #[test]
    fn test_overhead_light_has_finite_matrix() {
        let light = DirectionalLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(0.0, 30.0, 0.0),
            cast_shadow: true,
        };
        let m = ShadowConfig::default().light_space(&light);
        assert!(m.data.iter().all(|v| v.is_finite()));
        assert!(in_clip_volume(m.transform_point(Vec3::new(0.0, 11.0, 0.0))));
    }

    #[test]
    fn test_only_key_light_casts_by_default() {
        let lighting = LightingConfig::default();
        assert!(lighting.key.cast_shadow);
        assert!(!lighting.fill.cast_shadow);
        assert!(lighting.shadows_enabled());
    }

    #[test]
    fn test_radiance_scales_color() {
        let fill = LightingConfig::default().fill;
        let r = fill.radiance();
        assert!((r[0] - 0.3).abs() < 1e-6);
        assert!(r[2] < r[0]); // warm tint
    }
}
