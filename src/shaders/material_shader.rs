//! Generic material shader driven by a static variant description.
//!
//! Each concrete shader (cube map, reflection, OES, stereo) is a
//! [`ShaderVariant`] constant plus a thin typed wrapper around
//! [`MaterialShader`]. Everything else (compile, location lookup,
//! validation, uniform upload, draw) lives here once.

use glam::{Mat4, Vec3, Vec4};

use crate::backend::{GlBackend, ProgramHandle, TextureTarget};
use crate::error::{GlError, ShaderError};
use crate::resources::RenderData;
use crate::RendererConfig;

use super::bindings::InputBindings;
use super::diagnostics::check_gl_error;
use super::draw_path::DrawPath;
use super::names::{InputKind, ShaderInput, U_COLOR, U_OPACITY};
use super::program::GpuProgram;
use super::source::{ShaderSource, StageTemplate};

/// Static description of one shader in the family
#[derive(Debug)]
pub struct ShaderVariant {
    /// Name used in logs, errors and the GL error site tag
    pub name: &'static str,
    /// The only texture target `render` accepts
    pub required_target: TextureTarget,
    pub vertex: StageTemplate,
    pub fragment: StageTemplate,
    /// Generated source, built once per process
    pub source: fn() -> &'static ShaderSource,
}

impl ShaderVariant {
    /// Attributes declared by the vertex stage
    pub fn attributes(&self) -> Vec<ShaderInput> {
        self.vertex
            .declarations
            .iter()
            .filter(|declaration| declaration.input.kind() == InputKind::Attribute)
            .map(|declaration| declaration.input)
            .collect()
    }

    /// Uniforms declared by either stage, vertex stage first, without duplicates
    pub fn uniforms(&self) -> Vec<ShaderInput> {
        let mut uniforms = Vec::new();
        for declaration in self
            .vertex
            .declarations
            .iter()
            .chain(self.fragment.declarations)
        {
            if declaration.input.kind() == InputKind::Uniform
                && !uniforms.contains(&declaration.input)
            {
                uniforms.push(declaration.input);
            }
        }
        uniforms
    }

    /// GL error site tag for draws
    pub fn render_site(&self) -> String {
        format!("{}::render", self.name)
    }
}

/// Final fragment statement shared by every variant: the sampled `texel`
/// tinted by `u_color`, then every channel scaled by `u_opacity`.
pub(crate) fn fragment_output(texel: &str) -> String {
    format!(
        "gl_FragColor = vec4({texel}.r * {U_COLOR}.r * {U_OPACITY}, \
         {texel}.g * {U_COLOR}.g * {U_OPACITY}, \
         {texel}.b * {U_COLOR}.b * {U_OPACITY}, \
         {texel}.a * {U_OPACITY});"
    )
}

/// CPU reference for the shared fragment output.
pub fn shade_fragment(texel: Vec4, color: Vec3, opacity: f32) -> Vec4 {
    (texel.truncate() * color * opacity).extend(texel.w * opacity)
}

/// Generate the common plumbing of a typed variant wrapper.
///
/// The wrapper supplies its own `render` with the variant's exact inputs.
macro_rules! material_shader_wrapper {
    ($(#[$meta:meta])* $wrapper:ident, $variant:path) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $wrapper<B: $crate::backend::GlBackend> {
            inner: $crate::shaders::MaterialShader<B>,
        }

        impl<B: $crate::backend::GlBackend> $wrapper<B> {
            /// Build with the default renderer configuration.
            pub fn new(backend: &B) -> Result<Self, $crate::error::ShaderError> {
                Self::with_config(backend, &$crate::RendererConfig::default())
            }

            pub fn with_config(
                backend: &B,
                config: &$crate::RendererConfig,
            ) -> Result<Self, $crate::error::ShaderError> {
                Ok(Self {
                    inner: $crate::shaders::MaterialShader::new(backend, &$variant, config)?,
                })
            }

            pub fn shader(&self) -> &$crate::shaders::MaterialShader<B> {
                &self.inner
            }

            pub fn program_id(&self) -> Option<$crate::backend::ProgramHandle> {
                self.inner.program_id()
            }

            pub fn bindings(&self) -> &$crate::shaders::InputBindings {
                self.inner.bindings()
            }

            pub fn draw_path(&self) -> $crate::shaders::DrawPath {
                self.inner.draw_path()
            }

            pub fn is_recycled(&self) -> bool {
                self.inner.is_recycled()
            }

            /// Release the program; later renders fail with `Recycled`.
            pub fn recycle(&mut self) {
                self.inner.recycle()
            }
        }
    };
}

pub(crate) use material_shader_wrapper;

/// Per-call uniform values supplied by the driver.
///
/// Only the values the variant declares need to be set.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformValues<'a> {
    pub model: Option<&'a Mat4>,
    pub model_view: Option<&'a Mat4>,
    pub model_view_inverse_transpose: Option<&'a Mat4>,
    pub model_view_projection: Option<&'a Mat4>,
    pub view_inverse: Option<&'a Mat4>,
    /// Eye selector for stereo variants; `true` is the right eye
    pub right: Option<bool>,
}

impl<'a> UniformValues<'a> {
    pub fn with_mvp(mvp: &'a Mat4) -> Self {
        Self {
            model_view_projection: Some(mvp),
            ..Self::default()
        }
    }

    /// Matrix bound to a matrix uniform input
    pub fn matrix(&self, input: ShaderInput) -> Option<&'a Mat4> {
        match input {
            ShaderInput::Model => self.model,
            ShaderInput::ModelView => self.model_view,
            ShaderInput::ModelViewInverseTranspose => self.model_view_inverse_transpose,
            ShaderInput::ModelViewProjection => self.model_view_projection,
            ShaderInput::ViewInverse => self.view_inverse,
            _ => None,
        }
    }
}

fn is_matrix(input: ShaderInput) -> bool {
    matches!(
        input,
        ShaderInput::Model
            | ShaderInput::ModelView
            | ShaderInput::ModelViewInverseTranspose
            | ShaderInput::ModelViewProjection
            | ShaderInput::ViewInverse
    )
}

/// Outcome of a successful `render` call
#[derive(Debug, Clone, PartialEq)]
pub struct DrawReport {
    /// Number of indices drawn
    pub element_count: u32,
    pub draw_path: DrawPath,
    /// Errors the post-draw check found; the draw was still issued
    pub gl_errors: Vec<GlError>,
}

impl DrawReport {
    pub fn is_clean(&self) -> bool {
        self.gl_errors.is_empty()
    }
}

/// A compiled material shader.
///
/// Holds at most one program. [`MaterialShader::recycle`] releases it; after
/// that every `render` fails with [`ShaderError::Recycled`].
#[derive(Debug)]
pub struct MaterialShader<B: GlBackend> {
    backend: B,
    variant: &'static ShaderVariant,
    program: Option<GpuProgram<B>>,
    bindings: InputBindings,
    draw_path: DrawPath,
}

impl<B: GlBackend> MaterialShader<B> {
    /// Compile the variant's program and resolve its inputs.
    pub fn new(
        backend: &B,
        variant: &'static ShaderVariant,
        config: &RendererConfig,
    ) -> Result<Self, ShaderError> {
        let shader = variant.name;
        let capabilities = backend.capabilities();
        if !capabilities.supports_target(variant.required_target) {
            log::error!(
                "[{}] {}: context cannot sample {} textures",
                config.label,
                shader,
                variant.required_target
            );
            return Err(ShaderError::UnsupportedTarget {
                shader,
                target: variant.required_target,
            });
        }

        let program = GpuProgram::compile(backend, (variant.source)())
            .map_err(|source| ShaderError::CompileOrLink { shader, source })?;

        // On rejection the program is dropped here and deleted with it
        let bindings = InputBindings::resolve(
            backend,
            program.id(),
            shader,
            &variant.attributes(),
            &variant.uniforms(),
            config.unresolved_inputs,
        )?;

        let draw_path = match config.draw_path {
            Some(DrawPath::VertexArray) if !capabilities.vertex_array_objects => {
                log::warn!(
                    "[{}] {}: vertex arrays unsupported, using client arrays",
                    config.label,
                    shader
                );
                DrawPath::ClientArrays
            }
            Some(draw_path) => draw_path,
            None => DrawPath::detect(capabilities),
        };

        log::debug!(
            "[{}] {}: program {} ready, {} path, bindings {:?}",
            config.label,
            shader,
            program.id().raw(),
            draw_path,
            bindings
        );

        Ok(Self {
            backend: backend.clone(),
            variant,
            program: Some(program),
            bindings,
            draw_path,
        })
    }

    pub fn variant(&self) -> &'static ShaderVariant {
        self.variant
    }

    pub fn name(&self) -> &'static str {
        self.variant.name
    }

    pub fn bindings(&self) -> &InputBindings {
        &self.bindings
    }

    pub fn draw_path(&self) -> DrawPath {
        self.draw_path
    }

    /// Program handle, `None` once recycled
    pub fn program_id(&self) -> Option<ProgramHandle> {
        self.program.as_ref().map(GpuProgram::id)
    }

    pub fn is_recycled(&self) -> bool {
        self.program.is_none()
    }

    /// Release the program. Further calls do nothing.
    pub fn recycle(&mut self) {
        if let Some(program) = self.program.take() {
            log::debug!("{}: recycling program {}", self.name(), program.id().raw());
        }
    }

    /// Validate, bind state, and draw `render_data` with this shader.
    ///
    /// Nothing reaches the backend unless every check passes.
    pub fn render(
        &self,
        values: &UniformValues<'_>,
        render_data: &RenderData,
    ) -> Result<DrawReport, ShaderError> {
        let shader = self.variant.name;
        let program = match &self.program {
            Some(program) => program,
            None => return Err(self.reject(ShaderError::Recycled { shader })),
        };

        let mesh = render_data.mesh();
        let material = render_data.material();

        let texture = match material.main_texture() {
            Some(texture) => texture,
            None => return Err(self.reject(ShaderError::MissingTexture { shader })),
        };
        if texture.target() != self.variant.required_target {
            return Err(self.reject(ShaderError::TextureTargetMismatch {
                shader,
                expected: self.variant.required_target,
                actual: texture.target(),
            }));
        }

        for (input, _) in self.bindings.attributes() {
            if !mesh.has_attribute(input) {
                return Err(self.reject(ShaderError::MissingVertexData {
                    shader,
                    attribute: input.name(),
                }));
            }
        }

        for (input, _) in self.bindings.declared_uniforms() {
            let missing = if is_matrix(input) {
                values.matrix(input).is_none()
            } else {
                input == ShaderInput::Right && values.right.is_none()
            };
            if missing {
                return Err(self.reject(ShaderError::MissingUniformValue {
                    shader,
                    name: input.name(),
                }));
            }
        }

        let prepared = self
            .draw_path
            .prepare(&self.backend, &self.bindings, mesh)
            .map_err(|source| self.reject(ShaderError::VertexArray { shader, source }))?;

        let backend = &self.backend;
        backend.use_program(program.id());

        for (input, location) in self.bindings.declared_uniforms() {
            if input == ShaderInput::Texture {
                backend.active_texture(0);
                backend.bind_texture(texture.target(), texture.handle());
            }
            let Some(location) = location else {
                continue;
            };
            match input {
                ShaderInput::Texture => backend.uniform1i(location, 0),
                ShaderInput::Color => {
                    let color = material.color();
                    backend.uniform3f(location, color.x, color.y, color.z);
                }
                ShaderInput::Opacity => backend.uniform1f(location, material.opacity()),
                ShaderInput::Right => {
                    backend.uniform1i(location, i32::from(values.right.unwrap_or(false)))
                }
                _ => {
                    if let Some(matrix) = values.matrix(input) {
                        backend.uniform_matrix4(location, &matrix.to_cols_array());
                    }
                }
            }
        }

        let element_count = prepared.draw(backend, &self.bindings, mesh);
        let gl_errors = check_gl_error(backend, &self.variant.render_site());

        Ok(DrawReport {
            element_count,
            draw_path: self.draw_path,
            gl_errors,
        })
    }

    fn reject(&self, error: ShaderError) -> ShaderError {
        log::warn!("{}", error);
        error
    }
}
