//! Canopy surface mapping
//!
//! Spreads `N` ornaments over an ellipsoidal canopy. The azimuth advances by
//! the golden angle per index so no two neighbours line up, while the polar
//! angle sweeps a band that skips the crown and the underside.

use serde::{Serialize, Deserialize};
use crate::math::Vec3;

/// Shape of the canopy and the band ornaments are allowed to occupy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    /// Center of the canopy ellipsoid
    pub center: Vec3,
    /// Radius in the XZ plane
    pub radius_horizontal: f32,
    /// Radius along Y
    pub radius_vertical: f32,
    /// Subtracted from both radii so ornaments sit in the leaves
    pub inward_offset: f32,
    /// Azimuth step per index, radians
    pub golden_angle: f32,
    /// Polar angle of the first band edge, radians from +Y
    pub polar_start: f32,
    /// Width of the polar band, radians
    pub polar_span: f32,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 11.0, 0.0),
            radius_horizontal: 5.8,
            radius_vertical: 3.8,
            inward_offset: 0.15,
            golden_angle: 2.399963,
            polar_start: 0.5, // ~29 degrees
            polar_span: 2.1,  // band ends at ~149 degrees
        }
    }
}

impl CanopyConfig {
    pub fn polar_end(&self) -> f32 {
        self.polar_start + self.polar_span
    }
}

/// Angular coordinates of one placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAngles {
    /// Azimuth, unbounded (`index * golden_angle`)
    pub theta: f64,
    /// Polar angle from +Y
    pub phi: f64,
    /// Normalized position of the index in the sequence, in (0, 1)
    pub t: f64,
}

/// Deterministic index-to-point mapping onto the canopy
#[derive(Debug, Clone, Copy)]
pub struct CanopySurface {
    config: CanopyConfig,
}

impl CanopySurface {
    pub fn new(config: CanopyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// Radii after the inward offset, `(horizontal, vertical)`
    pub fn effective_radii(&self) -> (f32, f32) {
        (
            self.config.radius_horizontal - self.config.inward_offset,
            self.config.radius_vertical - self.config.inward_offset,
        )
    }

    /// Angles for `index` out of `count`, or `None` when the index is out of range
    pub fn angles(&self, index: usize, count: usize) -> Option<SurfaceAngles> {
        if index >= count {
            return None;
        }
        let i = index as f64;
        let t = (i + 0.5) / count as f64;
        Some(SurfaceAngles {
            theta: i * self.config.golden_angle as f64,
            phi: self.config.polar_start as f64 + t * self.config.polar_span as f64,
            t,
        })
    }

    /// Point on the shrunk ellipsoid at the given azimuth and polar angle
    pub fn point(&self, theta: f64, phi: f64) -> Vec3 {
        let (rx, ry) = self.effective_radii();
        let (rx, ry) = (rx as f64, ry as f64);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();

        self.config.center
            + Vec3::new(
                (rx * sin_phi * cos_theta) as f32,
                (ry * cos_phi) as f32,
                (rx * sin_phi * sin_theta) as f32,
            )
    }

    pub fn place(&self, index: usize, count: usize) -> Option<Vec3> {
        self.angles(index, count).map(|a| self.point(a.theta, a.phi))
    }

    /// One point per index in `0..count`; empty when `count` is zero
    pub fn placements(&self, count: usize) -> Vec<Vec3> {
        (0..count)
            .filter_map(|i| self.place(i, count))
            .collect()
    }
}

impl Default for CanopySurface {
    fn default() -> Self {
        Self::new(CanopyConfig::default())
    }
}
