//! Scene content: what gets drawn and where
//!
//! Everything here is plain CPU-side data. The render module uploads the
//! resulting meshes once and never touches them again.

pub mod canopy;
pub mod lighting;
pub mod ornament;
pub mod part;
pub mod tree;

pub use canopy::{CanopyConfig, CanopySurface, SurfaceAngles};
pub use lighting::{AmbientLight, DirectionalLight, LightingConfig, ShadowConfig};
pub use ornament::{OrnamentConfig, OrnamentFactory};
pub use part::ScenePart;
pub use tree::{BranchSpec, LeafCluster, TreeBuilder, TreeConfig, TreeGeometry};
