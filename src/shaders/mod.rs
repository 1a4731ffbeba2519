//! Material shader family
//!
//! Four GL ES programs, one per texture convention, built on the shared
//! [`MaterialShader`] mechanism:
//!
//! - [`CubemapShader`]: cube map sampled along the model-space position
//! - [`CubemapReflectionShader`]: cube map sampled along the reflected view ray
//! - [`OesShader`]: external image (video decoder, camera)
//! - [`UnlitVerticalStereoShader`]: one eye's half of a top/bottom stereo texture

mod bindings;
mod cubemap;
mod cubemap_reflection;
mod diagnostics;
mod draw_path;
mod manager;
mod material_shader;
pub mod names;
mod oes;
mod program;
pub mod source;
mod unlit_vertical_stereo;

pub use bindings::{InputBindings, UnresolvedInputPolicy};
pub use cubemap::{cubemap_sample_direction, CubemapShader, CUBEMAP_VARIANT};
pub use cubemap_reflection::{
    reflection_sample_direction, CubemapReflectionShader, CUBEMAP_REFLECTION_VARIANT,
};
pub use diagnostics::check_gl_error;
pub use draw_path::DrawPath;
pub use manager::ShaderManager;
pub use material_shader::{shade_fragment, DrawReport, MaterialShader, ShaderVariant, UniformValues};
pub use names::ShaderInput;
pub use oes::{OesShader, OES_VARIANT};
pub use program::GpuProgram;
pub use source::ShaderSource;
pub use unlit_vertical_stereo::{
    stereo_tex_coord, UnlitVerticalStereoShader, UNLIT_VERTICAL_STEREO_VARIANT,
};

/// Every variant of the family
pub static VARIANTS: [&ShaderVariant; 4] = [
    &CUBEMAP_REFLECTION_VARIANT,
    &CUBEMAP_VARIANT,
    &OES_VARIANT,
    &UNLIT_VERTICAL_STEREO_VARIANT,
];
