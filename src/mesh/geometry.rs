use crate::math::{Vec3, Mat4};
use super::material::Material;

/// Floats per vertex in the GPU buffer
pub const VERTEX_STRIDE: usize = 11;

/// A vertex with position, normal, and baked material attributes
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: [f32; 3],
    pub opacity: f32,
    pub specular: f32,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, material: &Material) -> Self {
        Self {
            position,
            normal,
            color: material.color.to_array(),
            opacity: material.opacity,
            specular: material.specular,
        }
    }

    /// Convert to flat array for WebGL buffer
    /// Layout: position(3) + normal(3) + color(3) + opacity(1) + specular(1) = 11 floats
    pub fn to_array(&self) -> [f32; VERTEX_STRIDE] {
        [
            self.position.x, self.position.y, self.position.z,
            self.normal.x, self.normal.y, self.normal.z,
            self.color[0], self.color[1], self.color[2],
            self.opacity,
            self.specular,
        ]
    }
}

/// A mesh composed of vertices and triangle indices
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add vertices and return the starting index
    pub fn add_vertices(&mut self, verts: impl IntoIterator<Item = Vertex>) -> u32 {
        let start = self.vertices.len() as u32;
        self.vertices.extend(verts);
        start
    }

    /// Add a triangle (indices are relative to the mesh's vertex buffer)
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Add a quad as two triangles (CCW winding)
    pub fn add_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    /// Merge another mesh into this one
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend(other.vertices.iter().copied());
        self.indices.extend(other.indices.iter().map(|idx| idx + offset));
    }

    /// Apply a rigid transform to every vertex
    ///
    /// Normals go through the rotation part only, so the transform must not
    /// scale; non-uniform shapes are built at their final proportions.
    pub fn transform(&mut self, m: &Mat4) {
        for v in &mut self.vertices {
            v.position = m.transform_point(v.position);
            v.normal = m.transform_direction(v.normal).normalize();
        }
    }

    pub fn transformed(mut self, m: &Mat4) -> Self {
        self.transform(m);
        self
    }

    /// Get vertex buffer data as flat f32 array
    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.to_array())
            .collect()
    }

    /// Get index data
    pub fn index_data(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Average of all vertex positions
    pub fn centroid(&self) -> Vec3 {
        if self.vertices.is_empty() {
            return Vec3::ZERO;
        }
        let mut sum = Vec3::ZERO;
        for v in &self.vertices {
            sum += v.position;
        }
        sum.scale(1.0 / self.vertices.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::material::Color;

    fn material() -> Material {
        Material::glossy(Color::from_hex(0xCC0000), 0.5)
    }

    fn triangle() -> Mesh {
        let m = material();
        let mut mesh = Mesh::new();
        mesh.add_vertices(vec![
            Vertex::new(Vec3::ZERO, Vec3::UP, &m),
            Vertex::new(Vec3::RIGHT, Vec3::UP, &m),
            Vertex::new(Vec3::new(0.0, 0.0, 1.0), Vec3::UP, &m),
        ]);
        mesh.add_triangle(0, 2, 1);
        mesh
    }

    #[test]
    fn test_vertex_to_array() {
        let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::UP, &material());
        let arr = v.to_array();
        assert_eq!(arr[0], 1.0); // position.x
        assert_eq!(arr[4], 1.0); // normal.y
        assert!((arr[6] - 0.8).abs() < 0.001); // red channel of #CC0000
        assert_eq!(arr[9], 1.0); // opacity
        assert_eq!(arr[10], 0.5); // specular
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = triangle();
        a.merge(&triangle());
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(&a.indices[3..], &[3, 5, 4]);
    }

    #[test]
    fn test_transform_moves_positions_not_normals() {
        let mesh = triangle().transformed(&Mat4::translation(Vec3::new(0.0, 5.0, 0.0)));
        assert_eq!(mesh.vertices[0].position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(mesh.vertices[0].normal, Vec3::UP);
    }

    #[test]
    fn test_vertex_data_flat() {
        assert_eq!(triangle().vertex_data().len(), 3 * VERTEX_STRIDE);
    }

    #[test]
    fn test_centroid() {
        let c = triangle().centroid();
        assert!((c.x - 1.0 / 3.0).abs() < 0.0001);
        assert!(Mesh::new().centroid() == Vec3::ZERO);
    }
}
