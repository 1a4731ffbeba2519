//! Material property bag

use std::collections::HashMap;

use glam::Vec3;

use super::texture::Texture;

/// Texture slot sampled by every material shader
pub const MAIN_TEXTURE: &str = "main_texture";
/// Color multiplied into the sampled texel
pub const COLOR: &str = "color";
/// Scalar multiplied into every channel, alpha included
pub const OPACITY: &str = "opacity";

/// Named textures, vectors and scalars used by material shaders
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    textures: HashMap<String, Texture>,
    vec3s: HashMap<String, Vec3>,
    floats: HashMap<String, f32>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

impl Material {
    /// A material with white color and full opacity
    pub fn new(name: &str) -> Self {
        let mut material = Self {
            name: name.to_string(),
            textures: HashMap::new(),
            vec3s: HashMap::new(),
            floats: HashMap::new(),
        };
        material.set_vec3(COLOR, Vec3::ONE);
        material.set_float(OPACITY, 1.0);
        material
    }

    pub fn texture(&self, key: &str) -> Option<Texture> {
        self.textures.get(key).copied()
    }

    pub fn set_texture(&mut self, key: &str, texture: Texture) {
        self.textures.insert(key.to_string(), texture);
    }

    pub fn remove_texture(&mut self, key: &str) -> Option<Texture> {
        self.textures.remove(key)
    }

    pub fn vec3(&self, key: &str) -> Option<Vec3> {
        self.vec3s.get(key).copied()
    }

    pub fn set_vec3(&mut self, key: &str, value: Vec3) {
        self.vec3s.insert(key.to_string(), value);
    }

    pub fn float(&self, key: &str) -> Option<f32> {
        self.floats.get(key).copied()
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.floats.insert(key.to_string(), value);
    }

    pub fn main_texture(&self) -> Option<Texture> {
        self.texture(MAIN_TEXTURE)
    }

    /// Tint color; white when unset
    pub fn color(&self) -> Vec3 {
        self.vec3(COLOR).unwrap_or(Vec3::ONE)
    }

    /// Opacity; 1.0 when unset
    pub fn opacity(&self) -> f32 {
        self.float(OPACITY).unwrap_or(1.0)
    }

    pub fn with_main_texture(mut self, texture: Texture) -> Self {
        self.set_texture(MAIN_TEXTURE, texture);
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.set_vec3(COLOR, color);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_float(OPACITY, opacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    #[test]
    fn test_defaults() {
        let material = Material::new("plain");
        assert_eq!(material.color(), Vec3::ONE);
        assert_eq!(material.opacity(), 1.0);
        assert!(material.main_texture().is_none());
    }

    #[test]
    fn test_builders_and_slots() {
        let backend = RecordingBackend::new();
        let texture = Texture::cube_map(backend.create_texture());
        let material = Material::new("sky")
            .with_main_texture(texture)
            .with_color(Vec3::new(0.5, 0.25, 1.0))
            .with_opacity(0.5);

        assert_eq!(material.main_texture(), Some(texture));
        assert_eq!(material.texture("detail"), None);
        assert_eq!(material.vec3(COLOR), Some(Vec3::new(0.5, 0.25, 1.0)));
        assert_eq!(material.opacity(), 0.5);
    }
}
