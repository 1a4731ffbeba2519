//! Shader for externally sourced images (video decoder, camera preview).

use glam::Mat4;
use once_cell::sync::Lazy;

use crate::backend::TextureTarget;
use crate::error::ShaderError;
use crate::resources::RenderData;

use super::material_shader::{
    fragment_output, material_shader_wrapper, DrawReport, ShaderVariant, UniformValues,
};
use super::names::*;
use super::source::{Declaration, GlslType, ShaderSource, StageTemplate};

const VERTEX: StageTemplate = StageTemplate {
    header: &[],
    declarations: &[
        Declaration::new(ShaderInput::Position, GlslType::Vec4),
        Declaration::new(ShaderInput::TexCoord, GlslType::Vec4),
        Declaration::new(ShaderInput::ModelViewProjection, GlslType::Mat4),
        Declaration::new(ShaderInput::VaryingTexCoord, GlslType::Vec2),
    ],
};

const FRAGMENT: StageTemplate = StageTemplate {
    header: &[
        "#extension GL_OES_EGL_image_external : require",
        "precision highp float;",
    ],
    declarations: &[
        Declaration::new(ShaderInput::Texture, GlslType::SamplerExternalOes),
        Declaration::new(ShaderInput::Color, GlslType::Vec3),
        Declaration::new(ShaderInput::Opacity, GlslType::Float),
        Declaration::new(ShaderInput::VaryingTexCoord, GlslType::Vec2),
    ],
};

static SOURCE: Lazy<ShaderSource> = Lazy::new(|| {
    ShaderSource::generate(
        &VERTEX,
        &format!(
            "{V_TEX_COORD} = {A_TEX_COORD}.xy;
             gl_Position = {U_MVP} * {A_POSITION};"
        ),
        &FRAGMENT,
        &format!(
            "vec4 color = texture2D({U_TEXTURE}, {V_TEX_COORD});
             {}",
            fragment_output("color")
        ),
    )
});

fn source() -> &'static ShaderSource {
    &SOURCE
}

pub static OES_VARIANT: ShaderVariant = ShaderVariant {
    name: "OesShader",
    required_target: TextureTarget::ExternalOes,
    vertex: VERTEX,
    fragment: FRAGMENT,
    source,
};

material_shader_wrapper!(
    /// Textured, tinted surface sampling an external OES image
    OesShader,
    OES_VARIANT
);

impl<B: crate::backend::GlBackend> OesShader<B> {
    /// Draw `render_data` with its external texture.
    pub fn render(&self, mvp: &Mat4, render_data: &RenderData) -> Result<DrawReport, ShaderError> {
        self.inner.render(&UniformValues::with_mvp(mvp), render_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Capabilities, RecordingBackend};

    #[test]
    fn test_source_enables_external_images() {
        let source = source();
        assert!(source
            .fragment
            .starts_with("#extension GL_OES_EGL_image_external : require\nprecision highp float;\n"));
        assert!(source.fragment.contains("uniform samplerExternalOES u_texture;"));
        assert!(source.vertex.contains("v_tex_coord = a_tex_coord.xy;"));
    }

    #[test]
    fn test_construction_needs_external_images() {
        let backend = RecordingBackend::with_capabilities(Capabilities {
            external_textures: false,
            ..Capabilities::GLES3
        });

        assert!(matches!(
            OesShader::new(&backend),
            Err(ShaderError::UnsupportedTarget {
                shader: "OesShader",
                target: TextureTarget::ExternalOes,
            })
        ));
        assert!(backend.commands().is_empty());
    }
}
