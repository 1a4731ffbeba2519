//! Material Shaders - GL ES material programs for mobile VR rendering
//!
//! A family of shader wrappers, each specialized for one texture convention:
//! cube-map reflection, plain cube map, external OES images, and vertically
//! split stereo textures. A shader compiles its program once, resolves its
//! named inputs once, and then binds per-draw state and issues an indexed
//! triangle draw on every `render` call.
//!
//! # Features
//! - Two vertex submission paths: cached vertex array objects or client arrays
//! - Texture target validation before any GPU call
//! - Post-draw GL error reporting that never fails the frame
//! - A recording backend for headless runs and tests
//! - A `glow` backend for real GL ES contexts (`glow-backend` feature)

pub mod backend;
pub mod error;
pub mod resources;
pub mod shaders;

pub use backend::{GlBackend, RecordingBackend, TextureTarget};
#[cfg(feature = "glow-backend")]
pub use backend::GlowBackend;
pub use error::{BackendError, GlError, ShaderError};
pub use resources::{Material, Mesh, RenderData, Texture};
pub use shaders::{
    CubemapReflectionShader, CubemapShader, DrawPath, DrawReport, OesShader, ShaderManager,
    UnlitVerticalStereoShader, UnresolvedInputPolicy,
};

/// Configuration shared by every material shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Vertex submission path; `None` picks one from the context capabilities
    pub draw_path: Option<DrawPath>,
    /// Handling of declared inputs the linker removed
    pub unresolved_inputs: UnresolvedInputPolicy,
    /// Prefix for log messages
    pub label: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            draw_path: None,
            unresolved_inputs: UnresolvedInputPolicy::Skip,
            label: "material-shaders".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn with_draw_path(mut self, draw_path: DrawPath) -> Self {
        self.draw_path = Some(draw_path);
        self
    }

    pub fn with_unresolved_inputs(mut self, policy: UnresolvedInputPolicy) -> Self {
        self.unresolved_inputs = policy;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = RendererConfig::default();
        assert_eq!(config.draw_path, None);
        assert_eq!(config.unresolved_inputs, UnresolvedInputPolicy::Skip);

        let config = config
            .with_draw_path(DrawPath::ClientArrays)
            .with_unresolved_inputs(UnresolvedInputPolicy::Reject)
            .with_label("player");
        assert_eq!(config.draw_path, Some(DrawPath::ClientArrays));
        assert_eq!(config.unresolved_inputs, UnresolvedInputPolicy::Reject);
        assert_eq!(config.label, "player");
    }
}
