pub mod geometry;
pub mod material;
pub mod primitives;

pub use geometry::{Mesh, Vertex, VERTEX_STRIDE};
pub use material::{Color, Material};
