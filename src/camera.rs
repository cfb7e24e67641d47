//! Orbit camera with damping
//!
//! The eye sits on a sphere around a target point. Drag input rotates the
//! sphere, the wheel scales its radius, and panning slides the target.
//! With damping on, input is queued and bled off a fraction per frame so
//! motion eases out after the pointer is released.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use serde::{Serialize, Deserialize};
use crate::math::{Vec3, Mat4};

/// Keeps the eye off the exact poles where the up vector degenerates
const POLE_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Polar limits in radians from +Y; `max_polar_angle` of pi/2 keeps the
    /// eye above the ground
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 200.0,
            position: Vec3::new(0.0, 10.0, 22.0), // pulled back to frame the whole tree
            target: Vec3::new(0.0, 8.0, 0.0),
            enable_damping: true,
            damping_factor: 0.05,
            min_polar_angle: 0.0,
            max_polar_angle: FRAC_PI_2,
            min_distance: 3.0,
            max_distance: 80.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    target: Vec3,
    radius: f32,
    /// Angle from +Y
    polar: f32,
    /// Angle around Y, zero on +Z
    azimuth: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let offset = config.position - config.target;
        let radius = offset.length().max(POLE_EPSILON);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        let azimuth = offset.x.atan2(offset.z);

        let mut camera = Self {
            config,
            target: config.target,
            radius,
            polar,
            azimuth,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        };
        camera.clamp();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.polar
    }

    pub fn azimuth_angle(&self) -> f32 {
        self.azimuth
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + Vec3::new(
            self.radius * sin_p * sin_a,
            self.radius * cos_p,
            self.radius * sin_p * cos_a,
        )
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.position(), self.target, Vec3::UP)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(self.config.fov_radians(), aspect, self.config.near, self.config.far)
    }

    /// Queue a rotation from a pointer drag of `(delta_x, delta_y)` pixels
    ///
    /// A drag across the full viewport height turns the camera a full circle.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_azimuth -= TAU * delta_x / h * self.config.rotate_speed;
        self.pending_polar -= TAU * delta_y / h * self.config.rotate_speed;
    }

    /// Dolly toward (`delta < 0`) or away from (`delta > 0`) the target
    ///
    /// Each unit of `delta` scales the distance by 1/0.95, so larger wheel
    /// steps move proportionally further.
    pub fn zoom(&mut self, delta: f32) {
        self.pending_scale /= 0.95f32.powf(self.config.zoom_speed * delta);
    }

    /// Queue a pan from a pointer drag, keeping the point under the cursor
    /// roughly fixed at the target's depth
    pub fn pan(&mut self, delta_x: f32, delta_y: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let eye = self.position();
        let forward = (self.target - eye).normalize();
        let right = forward.cross(&Vec3::UP).normalize();
        let up = right.cross(&forward);

        let target_distance = self.radius * (self.config.fov_radians() / 2.0).tan();
        let left = 2.0 * delta_x * target_distance / h * self.config.pan_speed;
        let raise = 2.0 * delta_y * target_distance / h * self.config.pan_speed;

        self.pending_pan += right.scale(-left) + up.scale(raise);
    }

    /// Advance one frame; returns true while the camera is still moving
    pub fn update(&mut self) -> bool {
        let share = if self.config.enable_damping {
            self.config.damping_factor.clamp(0.0, 1.0)
        } else {
            1.0
        };

        let before = (self.azimuth, self.polar, self.radius, self.target);

        self.azimuth += self.pending_azimuth * share;
        self.polar += self.pending_polar * share;
        self.target += self.pending_pan.scale(share);
        self.radius *= self.pending_scale;
        self.clamp();

        let decay = 1.0 - share;
        self.pending_azimuth *= decay;
        self.pending_polar *= decay;
        self.pending_pan = self.pending_pan.scale(decay);
        self.pending_scale = 1.0;

        (self.azimuth - before.0).abs() > 1e-6
            || (self.polar - before.1).abs() > 1e-6
            || (self.radius - before.2).abs() > 1e-6
            || self.target.distance(&before.3) > 1e-6
    }

    fn clamp(&mut self) {
        let min_polar = self.config.min_polar_angle.max(POLE_EPSILON);
        let max_polar = self.config.max_polar_angle.min(PI - POLE_EPSILON).max(min_polar);
        self.polar = self.polar.clamp(min_polar, max_polar);

        let min_distance = self.config.min_distance.max(POLE_EPSILON);
        let max_distance = self.config.max_distance.max(min_distance);
        self.radius = self.radius.clamp(min_distance, max_distance);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
