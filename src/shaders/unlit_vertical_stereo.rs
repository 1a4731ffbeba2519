//! Unlit shader for top/bottom stereo frames packed into one 2D texture.
//!
//! With `u_right` = 0 the vertical coordinate is mapped into `[0, 0.5]`, the
//! top half of the stacked image. With `u_right` = 1 it is mapped into
//! `[0.5, 1]`, the bottom half.

use glam::{Mat4, Vec2};
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
    header: &["precision highp float;"],
    declarations: &[
        Declaration::new(ShaderInput::Texture, GlslType::Sampler2D),
        Declaration::new(ShaderInput::Color, GlslType::Vec3),
        Declaration::new(ShaderInput::Opacity, GlslType::Float),
        Declaration::new(ShaderInput::Right, GlslType::Int),
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
            "vec2 tex_coord = vec2({V_TEX_COORD}.x, 0.5 * ({V_TEX_COORD}.y + float({U_RIGHT})));
             vec4 color = texture2D({U_TEXTURE}, tex_coord);
             {}",
            fragment_output("color")
        ),
    )
});

fn source() -> &'static ShaderSource {
    &SOURCE
}

pub static UNLIT_VERTICAL_STEREO_VARIANT: ShaderVariant = ShaderVariant {
    name: "UnlitVerticalStereoShader",
    required_target: TextureTarget::Texture2D,
    vertex: VERTEX,
    fragment: FRAGMENT,
    source,
};

material_shader_wrapper!(
    /// Unlit 2D shader selecting one eye's half of a stacked stereo texture
    UnlitVerticalStereoShader,
    UNLIT_VERTICAL_STEREO_VARIANT
);

impl<B: crate::backend::GlBackend> UnlitVerticalStereoShader<B> {
    /// Draw `render_data` for one eye.
    ///
    /// `right = false` samples v in `[0, 0.5]` (top half), `right = true`
    /// samples v in `[0.5, 1]` (bottom half).
    pub fn render(
        &self,
        mvp: &Mat4,
        render_data: &RenderData,
        right: bool,
    ) -> Result<DrawReport, ShaderError> {
        let values = UniformValues {
            right: Some(right),
            ..UniformValues::with_mvp(mvp)
        };
        self.inner.render(&values, render_data)
    }
}

/// CPU reference for the texture coordinate the fragment stage samples.
///
/// The `[0, 1]` vertical coordinate lands in `[0, 0.5]` for the left eye and
/// in `[0.5, 1]` for the right eye.
pub fn stereo_tex_coord(tex_coord: Vec2, right: bool) -> Vec2 {
    let eye = if right { 1.0 } else { 0.0 };
    Vec2::new(tex_coord.x, 0.5 * (tex_coord.y + eye))
}
