//! Owner of the material shader instances.

use crate::backend::GlBackend;
use crate::error::ShaderError;
use crate::RendererConfig;

use super::cubemap::CubemapShader;
use super::cubemap_reflection::CubemapReflectionShader;
use super::oes::OesShader;
use super::unlit_vertical_stereo::UnlitVerticalStereoShader;

/// Holds at most one instance of each material shader.
///
/// Shaders are built on first request with the manager's configuration, so
/// all of them share one draw path.
#[derive(Debug)]
pub struct ShaderManager<B: GlBackend> {
    backend: B,
    config: RendererConfig,
    cubemap: Option<CubemapShader<B>>,
    cubemap_reflection: Option<CubemapReflectionShader<B>>,
    oes: Option<OesShader<B>>,
    unlit_vertical_stereo: Option<UnlitVerticalStereoShader<B>>,
}

macro_rules! lazy_shader {
    ($(#[$meta:meta])* $accessor:ident, $field:ident, $shader:ident) => {
        $(#[$meta])*
        pub fn $accessor(&mut self) -> Result<&$shader<B>, ShaderError> {
            let shader = match self.$field.take() {
                Some(shader) => shader,
                None => {
                    log::debug!("ShaderManager: creating {}", stringify!($shader));
                    $shader::with_config(&self.backend, &self.config)?
                }
            };
            let shader: &$shader<B> = self.$field.insert(shader);
            Ok(shader)
        }
    };
}

impl<B: GlBackend> ShaderManager<B> {
    pub fn new(backend: &B, config: RendererConfig) -> Self {
        Self {
            backend: backend.clone(),
            config,
            cubemap: None,
            cubemap_reflection: None,
            oes: None,
            unlit_vertical_stereo: None,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    lazy_shader!(cubemap_shader, cubemap, CubemapShader);
    lazy_shader!(
        cubemap_reflection_shader,
        cubemap_reflection,
        CubemapReflectionShader
    );
    lazy_shader!(
        /// External-image (video) shader
        oes_shader,
        oes,
        OesShader
    );
    lazy_shader!(
        unlit_vertical_stereo_shader,
        unlit_vertical_stereo,
        UnlitVerticalStereoShader
    );

    /// Number of shaders currently built
    pub fn live_shaders(&self) -> usize {
        [
            self.cubemap.is_some(),
            self.cubemap_reflection.is_some(),
            self.oes.is_some(),
            self.unlit_vertical_stereo.is_some(),
        ]
        .into_iter()
        .filter(|built| *built)
        .count()
    }

    /// Recycle and forget every shader built so far.
    ///
    /// Accessors called afterwards build fresh instances.
    pub fn recycle_all(&mut self) {
        if let Some(mut shader) = self.cubemap.take() {
            shader.recycle();
        }
        if let Some(mut shader) = self.cubemap_reflection.take() {
            shader.recycle();
        }
        if let Some(mut shader) = self.oes.take() {
            shader.recycle();
        }
        if let Some(mut shader) = self.unlit_vertical_stereo.take() {
            shader.recycle();
        }
        log::debug!("ShaderManager: all shaders recycled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Capabilities, RecordingBackend};
    use crate::shaders::DrawPath;

    #[test]
    fn test_shaders_built_once_on_demand() {
        let backend = RecordingBackend::new();
        let mut manager = ShaderManager::new(&backend, RendererConfig::default());
        assert_eq!(manager.live_shaders(), 0);

        let first = manager.oes_shader().unwrap().program_id();
        let again = manager.oes_shader().unwrap().program_id();
        assert_eq!(first, again);
        assert_eq!(backend.live_programs(), 1);

        manager.cubemap_shader().unwrap();
        manager.cubemap_reflection_shader().unwrap();
        manager.unlit_vertical_stereo_shader().unwrap();
        assert_eq!(manager.live_shaders(), 4);
        assert_eq!(backend.live_programs(), 4);
    }

    #[test]
    fn test_recycle_all_releases_programs() {
        let backend = RecordingBackend::new();
        let mut manager = ShaderManager::new(&backend, RendererConfig::default());
        manager.cubemap_shader().unwrap();
        manager.oes_shader().unwrap();

        manager.recycle_all();
        assert_eq!(manager.live_shaders(), 0);
        assert_eq!(backend.live_programs(), 0);

        manager.cubemap_shader().unwrap();
        assert_eq!(backend.live_programs(), 1);
    }

    #[test]
    fn test_shared_draw_path() {
        let backend = RecordingBackend::with_capabilities(Capabilities::GLES2);
        let mut manager = ShaderManager::new(&backend, RendererConfig::default());
        assert_eq!(
            manager.oes_shader().unwrap().draw_path(),
            DrawPath::ClientArrays
        );
        assert_eq!(
            manager.cubemap_shader().unwrap().draw_path(),
            DrawPath::ClientArrays
        );
    }

    #[test]
    fn test_failed_build_leaves_slot_empty() {
        let backend = RecordingBackend::new();
        let mut manager = ShaderManager::new(&backend, RendererConfig::default());
        backend.fail_next_link("out of registers");

        assert!(manager.cubemap_shader().is_err());
        assert_eq!(manager.live_shaders(), 0);
        assert!(manager.cubemap_shader().is_ok());
    }
}
