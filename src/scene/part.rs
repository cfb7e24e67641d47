use crate::mesh::{Mesh, Material};

/// A mesh plus the passes it takes part in
#[derive(Debug, Clone, Default)]
pub struct ScenePart {
    pub mesh: Mesh,
    /// Drawn into the key light's depth map
    pub cast_shadow: bool,
    /// Darkened where the depth map says the key light is blocked
    pub receive_shadow: bool,
    /// Drawn after every opaque part, blended, without depth writes
    pub blended: bool,
}

impl ScenePart {
    /// An opaque part that neither casts nor receives shadows
    pub fn new(mesh: Mesh) -> Self {
        Self { mesh, ..Default::default() }
    }

    /// Blended when any of `materials` is translucent
    pub fn with_materials<'m>(mesh: Mesh, materials: impl IntoIterator<Item = &'m Material>) -> Self {
        let blended = materials.into_iter().any(Material::is_transparent);
        Self { blended, ..Self::new(mesh) }
    }

    pub fn casting(mut self, cast: bool) -> Self {
        self.cast_shadow = cast;
        self
    }

    pub fn receiving(mut self, receive: bool) -> Self {
        self.receive_shadow = receive;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Color;

    #[test]
    fn test_blending_follows_opacity() {
        let solid = Material::matte(Color::WHITE);
        let glass = Material::translucent(Color::WHITE, 0.5);

        assert!(!ScenePart::with_materials(Mesh::new(), [&solid]).blended);
        assert!(ScenePart::with_materials(Mesh::new(), [&solid, &glass]).blended);
    }

    #[test]
    fn test_builder_flags() {
        let part = ScenePart::new(Mesh::new()).casting(true).receiving(false);
        assert!(part.cast_shadow);
        assert!(!part.receive_shadow);
        assert!(!part.blended);
        assert!(part.is_empty());
    }
}
