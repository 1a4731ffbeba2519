//! Common utilities for material shader integration tests.
//!
//! Every shader runs against a [`RecordingBackend`], so the tests inspect the
//! exact GL command stream a real context would receive.

#![allow(dead_code)]

use glam::{Mat4, Vec3};

use material_shaders::backend::{Capabilities, GlCommand, RecordingBackend, TextureTarget};
use material_shaders::shaders::InputBindings;
use material_shaders::{
    CubemapReflectionShader, CubemapShader, DrawPath, DrawReport, Material, Mesh, OesShader,
    RenderData, RendererConfig, ShaderError, Texture, UnlitVerticalStereoShader,
};

// ============================================================================
// Shader Enumeration
// ============================================================================

/// The four shader variants under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    CubemapReflection,
    Cubemap,
    Oes,
    UnlitVerticalStereo,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::CubemapReflection,
        Variant::Cubemap,
        Variant::Oes,
        Variant::UnlitVerticalStereo,
    ];

    /// The texture target this variant accepts.
    pub fn target(&self) -> TextureTarget {
        match self {
            Variant::CubemapReflection | Variant::Cubemap => TextureTarget::CubeMap,
            Variant::Oes => TextureTarget::ExternalOes,
            Variant::UnlitVerticalStereo => TextureTarget::Texture2D,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variant::CubemapReflection => "CubemapReflectionShader",
            Variant::Cubemap => "CubemapShader",
            Variant::Oes => "OesShader",
            Variant::UnlitVerticalStereo => "UnlitVerticalStereoShader",
        }
    }
}

/// Any of the typed shader wrappers.
pub enum AnyShader {
    CubemapReflection(CubemapReflectionShader<RecordingBackend>),
    Cubemap(CubemapShader<RecordingBackend>),
    Oes(OesShader<RecordingBackend>),
    UnlitVerticalStereo(UnlitVerticalStereoShader<RecordingBackend>),
}

/// Fixed camera used by every render in the tests.
pub struct Matrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for Matrices {
    fn default() -> Self {
        Self {
            model: Mat4::from_rotation_y(0.25),
            view: Mat4::from_translation(Vec3::new(0.0, 0.0, -3.0)),
            projection: Mat4::perspective_rh_gl(1.2, 1.0, 0.1, 100.0),
        }
    }
}

impl AnyShader {
    pub fn render(&self, data: &RenderData, right: bool) -> Result<DrawReport, ShaderError> {
        let m = Matrices::default();
        let mv = m.view * m.model;
        let mv_it = mv.inverse().transpose();
        let view_inverse = m.view.inverse();
        let mvp = m.projection * mv;

        match self {
            AnyShader::CubemapReflection(shader) => {
                shader.render(&mv, &mv_it, &view_inverse, &mvp, data)
            }
            AnyShader::Cubemap(shader) => shader.render(&m.model, &mvp, data),
            AnyShader::Oes(shader) => shader.render(&mvp, data),
            AnyShader::UnlitVerticalStereo(shader) => shader.render(&mvp, data, right),
        }
    }

    pub fn bindings(&self) -> &InputBindings {
        match self {
            AnyShader::CubemapReflection(shader) => shader.bindings(),
            AnyShader::Cubemap(shader) => shader.bindings(),
            AnyShader::Oes(shader) => shader.bindings(),
            AnyShader::UnlitVerticalStereo(shader) => shader.bindings(),
        }
    }

    pub fn recycle(&mut self) {
        match self {
            AnyShader::CubemapReflection(shader) => shader.recycle(),
            AnyShader::Cubemap(shader) => shader.recycle(),
            AnyShader::Oes(shader) => shader.recycle(),
            AnyShader::UnlitVerticalStereo(shader) => shader.recycle(),
        }
    }

    pub fn program_id(&self) -> Option<material_shaders::backend::ProgramHandle> {
        match self {
            AnyShader::CubemapReflection(shader) => shader.program_id(),
            AnyShader::Cubemap(shader) => shader.program_id(),
            AnyShader::Oes(shader) => shader.program_id(),
            AnyShader::UnlitVerticalStereo(shader) => shader.program_id(),
        }
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// A recording backend plus the configuration shaders are built with.
pub struct TestContext {
    pub backend: RecordingBackend,
    pub config: RendererConfig,
}

impl TestContext {
    /// Context whose capabilities match the requested draw path.
    pub fn new(draw_path: DrawPath) -> Self {
        init_logging();
        let capabilities = match draw_path {
            DrawPath::VertexArray => Capabilities::GLES3,
            DrawPath::ClientArrays => Capabilities::GLES2,
        };
        Self {
            backend: RecordingBackend::with_capabilities(capabilities),
            config: RendererConfig::default().with_draw_path(draw_path),
        }
    }

    pub fn create_shader(&self, variant: Variant) -> Result<AnyShader, ShaderError> {
        let backend = &self.backend;
        let config = &self.config;
        Ok(match variant {
            Variant::CubemapReflection => {
                AnyShader::CubemapReflection(CubemapReflectionShader::with_config(backend, config)?)
            }
            Variant::Cubemap => AnyShader::Cubemap(CubemapShader::with_config(backend, config)?),
            Variant::Oes => AnyShader::Oes(OesShader::with_config(backend, config)?),
            Variant::UnlitVerticalStereo => AnyShader::UnlitVerticalStereo(
                UnlitVerticalStereoShader::with_config(backend, config)?,
            ),
        })
    }

    /// A white, fully opaque quad textured with a texture of `target`.
    pub fn quad(&self, target: TextureTarget) -> RenderData {
        let texture = Texture::new(self.backend.create_texture(), target);
        RenderData::new(
            Mesh::quad(),
            Material::new("test").with_main_texture(texture),
        )
    }

    pub fn draws(&self) -> usize {
        self.backend.count_commands(GlCommand::is_draw)
    }

    /// Uniform uploads recorded so far, in order.
    pub fn uniform_uploads(&self) -> Vec<GlCommand> {
        self.backend
            .commands()
            .into_iter()
            .filter(|command| {
                matches!(
                    command,
                    GlCommand::UniformMatrix4 { .. }
                        | GlCommand::Uniform3f { .. }
                        | GlCommand::Uniform1f { .. }
                        | GlCommand::Uniform1i { .. }
                )
            })
            .collect()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
