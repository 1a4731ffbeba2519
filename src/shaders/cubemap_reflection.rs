//! Environment reflection from a cube map.
//!
//! The view-space position is reflected about the view-space normal, then
//! taken back to world space to address the cube map.

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
        Declaration::new(ShaderInput::Normal, GlslType::Vec3),
        Declaration::new(ShaderInput::ModelView, GlslType::Mat4),
        Declaration::new(ShaderInput::ModelViewInverseTranspose, GlslType::Mat4),
        Declaration::new(ShaderInput::ModelViewProjection, GlslType::Mat4),
        Declaration::new(ShaderInput::ViewInverse, GlslType::Mat4),
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
            "vec4 view_position4 = {U_MV} * {A_POSITION};
             vec3 view_position = view_position4.xyz / view_position4.w;
             vec3 view_normal = ({U_MV_IT} * vec4({A_NORMAL}, 1.0)).xyz;
             vec3 reflected = reflect(view_position, normalize(view_normal));
             {V_TEX_COORD} = ({U_VIEW_I} * vec4(reflected, 1.0)).xyz;
             {V_TEX_COORD}.z = -{V_TEX_COORD}.z;
             gl_Position = {U_MVP} * {A_POSITION};"
        ),
        &FRAGMENT,
        &format!(
            "vec4 color = textureCube({U_TEXTURE}, {V_TEX_COORD}.xyz);
             {}",
            fragment_output("color")
        ),
    )
});

fn source() -> &'static ShaderSource {
    &SOURCE
}

pub static CUBEMAP_REFLECTION_VARIANT: ShaderVariant = ShaderVariant {
    name: "CubemapReflectionShader",
    required_target: TextureTarget::CubeMap,
    vertex: VERTEX,
    fragment: FRAGMENT,
    source,
};

material_shader_wrapper!(
    /// Mirror-like surface reflecting a cube-map environment
    CubemapReflectionShader,
    CUBEMAP_REFLECTION_VARIANT
);

impl<B: crate::backend::GlBackend> CubemapReflectionShader<B> {
    /// Draw `render_data`.
    ///
    /// `mv_it` is the inverse transpose of `mv`; `view_inverse` maps view
    /// space back to world space.
    pub fn render(
        &self,
        mv: &Mat4,
        mv_it: &Mat4,
        view_inverse: &Mat4,
        mvp: &Mat4,
        render_data: &RenderData,
    ) -> Result<DrawReport, ShaderError> {
        let values = UniformValues {
            model_view: Some(mv),
            model_view_inverse_transpose: Some(mv_it),
            view_inverse: Some(view_inverse),
            ..UniformValues::with_mvp(mvp)
        };
        self.inner.render(&values, render_data)
    }
}

/// CPU reference for the reflected cube-map lookup direction of one vertex.
pub fn reflection_sample_direction(
    mv: &Mat4,
    mv_it: &Mat4,
    view_inverse: &Mat4,
    position: Vec3,
    normal: Vec3,
) -> Vec3 {
    let view_position4 = *mv * position.extend(1.0);
    let view_position = view_position4.truncate() / view_position4.w;
    let view_normal = (*mv_it * normal.extend(1.0)).truncate().normalize_or_zero();
    let reflected = view_position - 2.0 * view_position.dot(view_normal) * view_normal;
    let direction = (*view_inverse * reflected.extend(1.0)).truncate();
    Vec3::new(direction.x, direction.y, -direction.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_reflects_in_view_space() {
        let source = source();
        assert!(source.vertex.contains("attribute vec3 a_normal;"));
        assert!(source
            .vertex
            .contains("vec3 view_normal = (u_mv_it * vec4(a_normal, 1.0)).xyz;"));
        assert!(source
            .vertex
            .contains("vec3 reflected = reflect(view_position, normalize(view_normal));"));
        assert!(source.vertex.contains("v_tex_coord.z = -v_tex_coord.z;"));
        assert!(source.fragment.contains("textureCube(u_texture, v_tex_coord.xyz)"));
    }

    #[test]
    fn test_head_on_reflection_with_identity_view() {
        // a surface facing the viewer sends the view ray straight back
        let direction = reflection_sample_direction(
            &Mat4::IDENTITY,
            &Mat4::IDENTITY,
            &Mat4::IDENTITY,
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::Z,
        );
        assert!((direction - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-6);
    }

    #[test]
    fn test_direction_negates_world_z() {
        let mv = Mat4::from_rotation_x(0.4);
        let mv_it = mv.inverse().transpose();
        let view_inverse = Mat4::from_rotation_y(-0.7);
        let position = Vec3::new(0.3, -0.2, -1.5);
        let normal = Vec3::new(0.0, 0.6, 0.8);

        let direction = reflection_sample_direction(&mv, &mv_it, &view_inverse, position, normal);

        let p = (mv * position.extend(1.0)).truncate();
        let n = (mv_it * normal.extend(1.0)).truncate().normalize();
        let r = p - 2.0 * p.dot(n) * n;
        let naive = (view_inverse * r.extend(1.0)).truncate();
        assert!((direction.x - naive.x).abs() < 1e-5);
        assert!((direction.y - naive.y).abs() < 1e-5);
        assert!((direction.z + naive.z).abs() < 1e-5);
    }

    #[test]
    fn test_declares_four_matrices() {
        let uniforms = CUBEMAP_REFLECTION_VARIANT.uniforms();
        for input in [
            ShaderInput::ModelView,
            ShaderInput::ModelViewInverseTranspose,
            ShaderInput::ModelViewProjection,
            ShaderInput::ViewInverse,
        ] {
            assert!(uniforms.contains(&input), "{input}");
        }
        assert_eq!(
            CUBEMAP_REFLECTION_VARIANT.attributes(),
            vec![ShaderInput::Position, ShaderInput::Normal]
        );
    }
}
