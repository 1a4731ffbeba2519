//! Cube-map shader sampling along the model-space position direction.

use glam::{Mat4, Vec3};
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
        Declaration::new(ShaderInput::Model, GlslType::Mat4),
        Declaration::new(ShaderInput::ModelViewProjection, GlslType::Mat4),
        Declaration::new(ShaderInput::VaryingTexCoord, GlslType::Vec3),
    ],
};

const FRAGMENT: StageTemplate = StageTemplate {
    header: &["precision highp float;"],
    declarations: &[
        Declaration::new(ShaderInput::Texture, GlslType::SamplerCube),
        Declaration::new(ShaderInput::Color, GlslType::Vec3),
        Declaration::new(ShaderInput::Opacity, GlslType::Float),
        Declaration::new(ShaderInput::VaryingTexCoord, GlslType::Vec3),
    ],
};

static SOURCE: Lazy<ShaderSource> = Lazy::new(|| {
    ShaderSource::generate(
        &VERTEX,
        &format!(
            "{V_TEX_COORD} = normalize(({U_MODEL} * {A_POSITION}).xyz);
             {V_TEX_COORD}.z = -{V_TEX_COORD}.z;
             gl_Position = {U_MVP} * {A_POSITION};"
        ),
        &FRAGMENT,
        &format!(
            "vec4 color = textureCube({U_TEXTURE}, {V_TEX_COORD});
             {}",
            fragment_output("color")
        ),
    )
});

fn source() -> &'static ShaderSource {
    &SOURCE
}

pub static CUBEMAP_VARIANT: ShaderVariant = ShaderVariant {
    name: "CubemapShader",
    required_target: TextureTarget::CubeMap,
    vertex: VERTEX,
    fragment: FRAGMENT,
    source,
};

material_shader_wrapper!(
    /// Skybox-style cube-map shader
    CubemapShader,
    CUBEMAP_VARIANT
);

impl<B: crate::backend::GlBackend> CubemapShader<B> {
    pub fn render(
        &self,
        model: &Mat4,
        mvp: &Mat4,
        render_data: &RenderData,
    ) -> Result<DrawReport, ShaderError> {
        let values = UniformValues {
            model: Some(model),
            ..UniformValues::with_mvp(mvp)
        };
        self.inner.render(&values, render_data)
    }
}

/// CPU reference for the cube-map lookup direction of one vertex.
///
/// Cube maps are addressed left-handed, so z is flipped.
pub fn cubemap_sample_direction(model: &Mat4, position: Vec3) -> Vec3 {
    let direction = (*model * position.extend(1.0)).truncate().normalize_or_zero();
    Vec3::new(direction.x, direction.y, -direction.z)
}
