//! Scene configuration
//!
//! Every visual constant of the scene lives here with its tuned default.
//! A host page can override any subset by passing YAML to `mount` or
//! `FruitTreeScene::with_config`:
//!
//! ```yaml
//! fruit_endpoint: /api/tree-data/
//! canopy:
//!   inward_offset: 0.2
//! lighting:
//!   background: "#101820"
//! ```

use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::camera::CameraConfig;
use crate::scene::{CanopyConfig, LightingConfig, OrnamentConfig, TreeConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Id of the element the canvas is appended to
    pub container_id: String,
    /// URL answering `{"fruits": [...]}`
    pub fruit_endpoint: String,
    /// Used when the container reports zero height
    pub fallback_height: u32,
    pub canopy: CanopyConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub ornament: OrnamentConfig,
    pub tree: TreeConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            container_id: "tree-container".to_string(),
            fruit_endpoint: "/api/tree-data/".to_string(),
            fallback_height: 500,
            canopy: CanopyConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            ornament: OrnamentConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse from YAML, filling unspecified fields with defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = if yaml.trim().is_empty() {
            SceneConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let canopy = &self.canopy;
        finite("canopy.center", &canopy.center.to_array())?;
        finite(
            "canopy",
            &[
                canopy.radius_horizontal,
                canopy.radius_vertical,
                canopy.inward_offset,
                canopy.golden_angle,
                canopy.polar_start,
                canopy.polar_span,
            ],
        )?;
        if canopy.radius_horizontal <= 0.0 || canopy.radius_vertical <= 0.0 {
            return Err(ConfigError::invalid("canopy", "radii must be positive"));
        }
        if canopy.inward_offset < 0.0
            || canopy.inward_offset >= canopy.radius_horizontal.min(canopy.radius_vertical)
        {
            return Err(ConfigError::invalid(
                "canopy.inward_offset",
                format!("{} must be in [0, smallest radius)", canopy.inward_offset),
            ));
        }
        if canopy.polar_span <= 0.0 {
            return Err(ConfigError::invalid("canopy.polar_span", "band must not be empty"));
        }
        if canopy.polar_start < 0.0 || canopy.polar_end() > std::f32::consts::PI {
            return Err(ConfigError::invalid(
                "canopy.polar_start",
                format!("band [{}, {}] leaves [0, pi]", canopy.polar_start, canopy.polar_end()),
            ));
        }

        let camera = &self.camera;
        finite("camera.position", &camera.position.to_array())?;
        finite("camera.target", &camera.target.to_array())?;
        finite(
            "camera",
            &[
                camera.fov_degrees,
                camera.near,
                camera.far,
                camera.damping_factor,
                camera.min_polar_angle,
                camera.max_polar_angle,
                camera.min_distance,
                camera.max_distance,
                camera.rotate_speed,
                camera.zoom_speed,
                camera.pan_speed,
            ],
        )?;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::invalid("camera.fov_degrees", "must be in (0, 180)"));
        }
        if camera.near <= 0.0 || camera.far <= camera.near {
            return Err(ConfigError::invalid("camera", "need 0 < near < far"));
        }
        if !(0.0..=1.0).contains(&camera.damping_factor) {
            return Err(ConfigError::invalid("camera.damping_factor", "must be in [0, 1]"));
        }
        if camera.min_polar_angle > camera.max_polar_angle {
            return Err(ConfigError::invalid("camera.min_polar_angle", "exceeds max_polar_angle"));
        }
        if camera.min_distance < 0.0 || camera.min_distance > camera.max_distance {
            return Err(ConfigError::invalid("camera", "need 0 <= min_distance <= max_distance"));
        }

        let lighting = &self.lighting;
        finite("lighting.key.position", &lighting.key.position.to_array())?;
        finite("lighting.fill.position", &lighting.fill.position.to_array())?;
        finite("lighting.shadow.center", &lighting.shadow.center.to_array())?;
        finite(
            "lighting",
            &[
                lighting.fog_near,
                lighting.fog_far,
                lighting.shininess,
                lighting.ambient.intensity,
                lighting.key.intensity,
                lighting.fill.intensity,
                lighting.shadow.radius,
                lighting.shadow.bias,
            ],
        )?;
        if lighting.shadows_enabled() {
            let shadow = &lighting.shadow;
            if shadow.radius <= 0.0 {
                return Err(ConfigError::invalid("lighting.shadow.radius", "must be positive"));
            }
            if !(256..=4096).contains(&shadow.map_size) {
                return Err(ConfigError::invalid(
                    "lighting.shadow.map_size",
                    format!("{} must be in [256, 4096]", shadow.map_size),
                ));
            }
            if lighting.key.position.length_squared() == 0.0 {
                return Err(ConfigError::invalid("lighting.key.position", "casting light needs a direction"));
            }
        }

        if self.fallback_height == 0 {
            return Err(ConfigError::invalid("fallback_height", "must be positive"));
        }
        Ok(())
    }
}

fn finite(field: &'static str, values: &[f32]) -> Result<(), ConfigError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(ConfigError::invalid(field, format!("{} is not finite", v))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::mesh::Color;

    #[test]
    fn test_defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.container_id, "tree-container");
        assert_eq!(config.fruit_endpoint, "/api/tree-data/");
        assert_eq!(config.canopy.inward_offset, 0.15);
        assert_eq!(config.canopy.golden_angle, 2.399963);
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        assert_eq!(SceneConfig::from_yaml("").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let yaml = r##"
fruit_endpoint: "/fruits.json"
canopy:
  center: [0.0, 12.0, 0.0]
  inward_offset: 0.3
lighting:
  background: "#101820"
camera:
  enable_damping: false
"##;
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.fruit_endpoint, "/fruits.json");
        assert_eq!(config.canopy.center, Vec3::new(0.0, 12.0, 0.0));
        assert_eq!(config.canopy.inward_offset, 0.3);
        // Untouched siblings keep their defaults
        assert_eq!(config.canopy.radius_horizontal, 5.8);
        assert_eq!(config.lighting.background, Color::from_hex(0x101820));
        assert_eq!(config.lighting.fog_near, 40.0);
        assert!(!config.camera.enable_damping);
        assert_eq!(config.tree.branches.len(), 8);
    }

    #[test]
    fn test_tree_lists_can_be_replaced() {
        let yaml = r#"
tree:
  branches:
    - base: [0.0, 6.0, 0.0]
      rotation: [0.0, 0.0, 0.5]
      length: 4.0
  leaf_clusters: []
"#;
        let config = SceneConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.tree.branches.len(), 1);
        assert!(config.tree.leaf_clusters.is_empty());
    }

    #[test]
    fn test_malformed_yaml() {
        let result = SceneConfig::from_yaml("canopy: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_offset_larger_than_radius_rejected() {
        let yaml = "canopy:\n  inward_offset: 4.0\n";
        let err = SceneConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("canopy.inward_offset"));
    }

    #[test]
    fn test_band_outside_sphere_rejected() {
        let yaml = "canopy:\n  polar_start: 2.0\n  polar_span: 2.0\n";
        assert!(SceneConfig::from_yaml(yaml).is_err());
        let yaml = "canopy:\n  polar_span: 0.0\n";
        assert!(SceneConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bad_camera_rejected() {
        assert!(SceneConfig::from_yaml("camera:\n  near: 0.0\n").is_err());
        assert!(SceneConfig::from_yaml("camera:\n  damping_factor: 1.5\n").is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let cases = [
            ("canopy:\n  radius_horizontal: .nan\n", "canopy"),
            ("canopy:\n  center: [0.0, .inf, 0.0]\n", "canopy.center"),
            ("canopy:\n  golden_angle: -.inf\n", "canopy"),
            ("canopy:\n  polar_span: .nan\n", "canopy"),
            ("camera:\n  far: .inf\n", "camera"),
            ("camera:\n  max_distance: .inf\n", "camera"),
            ("camera:\n  target: [.nan, 8.0, 0.0]\n", "camera.target"),
            ("camera:\n  zoom_speed: .nan\n", "camera"),
            ("lighting:\n  shadow:\n    bias: .nan\n", "lighting"),
        ];
        for (yaml, field) in cases {
            let err = SceneConfig::from_yaml(yaml).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Invalid { field: f, .. } if *f == field),
                "{:?} gave {}",
                yaml,
                err
            );
        }
    }

    #[test]
    fn test_camera_limits_must_be_ordered() {
        assert!(SceneConfig::from_yaml("camera:\n  min_distance: 90.0\n").is_err());
        assert!(SceneConfig::from_yaml("camera:\n  min_polar_angle: 2.0\n").is_err());
    }

    #[test]
    fn test_shadow_settings_checked_only_when_casting() {
        assert!(SceneConfig::from_yaml("lighting:\n  shadow:\n    map_size: 16\n").is_err());
        assert!(SceneConfig::from_yaml("lighting:\n  shadow:\n    radius: 0.0\n").is_err());

        let yaml = "lighting:\n  shadow:\n    enabled: false\n    map_size: 16\n";
        assert!(SceneConfig::from_yaml(yaml).is_ok());
    }
}
