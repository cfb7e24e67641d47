use super::Vec3;

const W: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// 4x4 matrix stored column-major, the layout WebGL uniforms expect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub data: [f32; 16],
}

impl Mat4 {
    /// Assemble from four columns
    pub const fn from_cols(x: [f32; 4], y: [f32; 4], z: [f32; 4], w: [f32; 4]) -> Self {
        Self {
            data: [
                x[0], x[1], x[2], x[3],
                y[0], y[1], y[2], y[3],
                z[0], z[1], z[2], z[3],
                w[0], w[1], w[2], w[3],
            ],
        }
    }

    pub const fn identity() -> Self {
        Self::from_cols([1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], W)
    }

    pub fn translation(offset: Vec3) -> Self {
        let mut m = Self::identity();
        m.data[12..15].copy_from_slice(&offset.to_array());
        m
    }

    pub fn rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols([1.0, 0.0, 0.0, 0.0], [0.0, c, s, 0.0], [0.0, -s, c, 0.0], W)
    }

    pub fn rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols([c, 0.0, -s, 0.0], [0.0, 1.0, 0.0, 0.0], [s, 0.0, c, 0.0], W)
    }

    pub fn rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols([c, s, 0.0, 0.0], [-s, c, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], W)
    }

    /// Intrinsic X-then-Y-then-Z Euler rotation, composed as `Rx * Ry * Rz`
    pub fn rotation_euler_xyz(angles: Vec3) -> Self {
        Self::rotation_x(angles.x)
            .mul(&Self::rotation_y(angles.y))
            .mul(&Self::rotation_z(angles.z))
    }

    /// Rigid placement: rotate about the local origin, then move to `position`
    pub fn from_position_rotation(position: Vec3, euler: Vec3) -> Self {
        Self::translation(position).mul(&Self::rotation_euler_xyz(euler))
    }

    /// OpenGL-style perspective projection with depth mapped to [-1, 1]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let focal = 1.0 / (fov_y * 0.5).tan();
        let inv_depth = 1.0 / (near - far);
        Self::from_cols(
            [focal / aspect, 0.0, 0.0, 0.0],
            [0.0, focal, 0.0, 0.0],
            [0.0, 0.0, (far + near) * inv_depth, -1.0],
            [0.0, 0.0, 2.0 * far * near * inv_depth, 0.0],
        )
    }

    /// OpenGL-style orthographic projection of the box `[left, right]` x
    /// `[bottom, top]` x `[-near, -far]` in view space
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let (w, h, d) = (right - left, top - bottom, far - near);
        Self::from_cols(
            [2.0 / w, 0.0, 0.0, 0.0],
            [0.0, 2.0 / h, 0.0, 0.0],
            [0.0, 0.0, -2.0 / d, 0.0],
            [-(right + left) / w, -(top + bottom) / h, -(far + near) / d, 1.0],
        )
    }

    /// View matrix for an eye at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let side = forward.cross(&up).normalize();
        let true_up = side.cross(&forward);
        Self::from_cols(
            [side.x, true_up.x, -forward.x, 0.0],
            [side.y, true_up.y, -forward.y, 0.0],
            [side.z, true_up.z, -forward.z, 0.0],
            [-side.dot(&eye), -true_up.dot(&eye), forward.dot(&eye), 1.0],
        )
    }

    /// `self * other`
    pub fn mul(&self, other: &Mat4) -> Self {
        let data = std::array::from_fn(|i| {
            let (row, col) = (i % 4, i / 4);
            (0..4).map(|k| self.data[row + k * 4] * other.data[k + col * 4]).sum()
        });
        Self { data }
    }

    /// Multiply `(v, w)` by the upper three rows
    fn apply(&self, v: Vec3, w: f32) -> Vec3 {
        let m = &self.data;
        let row = |r: usize| m[r] * v.x + m[r + 4] * v.y + m[r + 8] * v.z + m[r + 12] * w;
        Vec3::new(row(0), row(1), row(2))
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.apply(p, 1.0)
    }

    /// Rotate/scale only; translation is ignored
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.apply(d, 0.0)
    }

    pub fn as_slice(&self) -> &[f32; 16] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(&b) < 0.0001
    }

    #[test]
    fn test_translation() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(m.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
        // Directions ignore translation
        assert!(approx(m.transform_direction(Vec3::UP), Vec3::UP));
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let m = Mat4::rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(approx(m.transform_point(Vec3::RIGHT), Vec3::UP));
    }

    #[test]
    fn test_euler_applies_z_first() {
        // Z quarter turn maps +X to +Y, then Y quarter turn leaves +Y alone
        let half_pi = std::f32::consts::FRAC_PI_2;
        let m = Mat4::rotation_euler_xyz(Vec3::new(0.0, half_pi, half_pi));
        assert!(approx(m.transform_point(Vec3::RIGHT), Vec3::UP));
    }

    #[test]
    fn test_position_rotation_order() {
        let m = Mat4::from_position_rotation(
            Vec3::new(0.0, 7.0, 0.0),
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
        );
        // Rotate first, then translate
        assert!(approx(m.transform_point(Vec3::UP), Vec3::new(-1.0, 7.0, 0.0)));
    }

    #[test]
    fn test_look_at_moves_eye_to_origin() {
        let eye = Vec3::new(0.0, 10.0, 22.0);
        let view = Mat4::look_at(eye, Vec3::new(0.0, 8.0, 0.0), Vec3::UP);
        assert!(approx(view.transform_point(eye), Vec3::ZERO));
    }

    #[test]
    fn test_orthographic_maps_box_to_unit_cube() {
        let m = Mat4::orthographic(-2.0, 2.0, -1.0, 1.0, 1.0, 11.0);
        assert!(approx(m.transform_point(Vec3::new(-2.0, -1.0, -1.0)), Vec3::new(-1.0, -1.0, -1.0)));
        assert!(approx(m.transform_point(Vec3::new(2.0, 1.0, -11.0)), Vec3::new(1.0, 1.0, 1.0)));
        assert!(approx(m.transform_point(Vec3::new(0.0, 0.0, -6.0)), Vec3::ZERO));
    }

    #[test]
    fn test_identity_mul() {
        let t = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(Mat4::identity().mul(&t), t);
    }
}
