//! Input locations resolved against one linked program.

use crate::backend::{AttribLocation, GlBackend, ProgramHandle, UniformLocation};
use crate::error::ShaderError;

use super::names::ShaderInput;

/// What to do with a declared input the linker did not keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedInputPolicy {
    /// Keep the shader; the input is neither set nor wired at render time
    #[default]
    Skip,
    /// Fail construction with [`ShaderError::UnresolvedInput`]
    Reject,
}

/// Locations for every attribute and uniform a shader declares.
///
/// Resolved once, right after linking, and never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBindings {
    attributes: Vec<(ShaderInput, Option<AttribLocation>)>,
    uniforms: Vec<(ShaderInput, Option<UniformLocation>)>,
}

impl InputBindings {
    pub fn resolve<B: GlBackend>(
        backend: &B,
        program: ProgramHandle,
        shader: &'static str,
        attributes: &[ShaderInput],
        uniforms: &[ShaderInput],
        policy: UnresolvedInputPolicy,
    ) -> Result<Self, ShaderError> {
        let attributes: Vec<_> = attributes
            .iter()
            .map(|&input| (input, backend.attrib_location(program, input.name())))
            .collect();
        let uniforms: Vec<_> = uniforms
            .iter()
            .map(|&input| (input, backend.uniform_location(program, input.name())))
            .collect();

        let bindings = Self {
            attributes,
            uniforms,
        };

        for input in bindings.unresolved() {
            log::debug!("{}: input `{}` not found in program", shader, input);
            if policy == UnresolvedInputPolicy::Reject {
                return Err(ShaderError::UnresolvedInput {
                    shader,
                    name: input.name(),
                });
            }
        }

        Ok(bindings)
    }

    pub fn attribute(&self, input: ShaderInput) -> Option<AttribLocation> {
        self.attributes
            .iter()
            .find(|(candidate, _)| *candidate == input)
            .and_then(|(_, location)| *location)
    }

    pub fn uniform(&self, input: ShaderInput) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .find(|(candidate, _)| *candidate == input)
            .and_then(|(_, location)| *location)
    }

    /// Resolved attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = (ShaderInput, AttribLocation)> + '_ {
        self.attributes
            .iter()
            .filter_map(|(input, location)| location.map(|location| (*input, location)))
    }

    /// Resolved uniforms in declaration order
    pub fn uniforms(&self) -> impl Iterator<Item = (ShaderInput, UniformLocation)> + '_ {
        self.uniforms
            .iter()
            .filter_map(|(input, location)| location.map(|location| (*input, location)))
    }

    /// Every declared uniform with its location, in declaration order
    pub fn declared_uniforms(
        &self,
    ) -> impl Iterator<Item = (ShaderInput, Option<UniformLocation>)> + '_ {
        self.uniforms.iter().copied()
    }

    /// Declared inputs the program did not expose
    pub fn unresolved(&self) -> impl Iterator<Item = ShaderInput> + '_ {
        let attributes = self
            .attributes
            .iter()
            .filter(|(_, location)| location.is_none())
            .map(|(input, _)| *input);
        let uniforms = self
            .uniforms
            .iter()
            .filter(|(_, location)| location.is_none())
            .map(|(input, _)| *input);
        attributes.chain(uniforms)
    }

    /// Which declared inputs resolved, independent of location values
    pub fn resolution_pattern(&self) -> Vec<(ShaderInput, bool)> {
        self.attributes
            .iter()
            .map(|(input, location)| (*input, location.is_some()))
            .chain(
                self.uniforms
                    .iter()
                    .map(|(input, location)| (*input, location.is_some())),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    const VERTEX: &str = "attribute vec4 a_position;\nattribute vec3 a_normal;\nuniform mat4 u_mvp;\nvoid main() {\n}\n";
    const FRAGMENT: &str = "precision highp float;\nuniform float u_opacity;\nvoid main() {\n}\n";

    const ATTRIBUTES: &[ShaderInput] = &[ShaderInput::Position, ShaderInput::Normal];
    const UNIFORMS: &[ShaderInput] = &[ShaderInput::ModelViewProjection, ShaderInput::Opacity];

    #[test]
    fn test_resolve_all_declared() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(VERTEX, FRAGMENT).unwrap();
        let bindings = InputBindings::resolve(
            &backend,
            program,
            "Test",
            ATTRIBUTES,
            UNIFORMS,
            UnresolvedInputPolicy::Skip,
        )
        .unwrap();

        assert_eq!(bindings.attribute(ShaderInput::Position), Some(AttribLocation(0)));
        assert_eq!(bindings.attribute(ShaderInput::Normal), Some(AttribLocation(1)));
        assert!(bindings.uniform(ShaderInput::Opacity).is_some());
        assert_eq!(bindings.unresolved().count(), 0);
        assert_eq!(bindings.attributes().count(), 2);
        assert_eq!(bindings.uniforms().count(), 2);
    }

    #[test]
    fn test_skip_policy_keeps_unresolved_inputs() {
        let backend = RecordingBackend::new();
        backend.optimize_out("a_normal");
        let program = backend.create_program(VERTEX, FRAGMENT).unwrap();
        let bindings = InputBindings::resolve(
            &backend,
            program,
            "Test",
            ATTRIBUTES,
            UNIFORMS,
            UnresolvedInputPolicy::Skip,
        )
        .unwrap();

        assert_eq!(bindings.attribute(ShaderInput::Normal), None);
        assert_eq!(bindings.declared_uniforms().count(), 2);
        assert_eq!(bindings.unresolved().collect::<Vec<_>>(), vec![ShaderInput::Normal]);
        assert_eq!(
            bindings.resolution_pattern(),
            vec![
                (ShaderInput::Position, true),
                (ShaderInput::Normal, false),
                (ShaderInput::ModelViewProjection, true),
                (ShaderInput::Opacity, true),
            ]
        );
    }

    #[test]
    fn test_reject_policy_fails_on_unresolved_input() {
        let backend = RecordingBackend::new();
        backend.optimize_out("u_opacity");
        let program = backend.create_program(VERTEX, FRAGMENT).unwrap();
        let result = InputBindings::resolve(
            &backend,
            program,
            "Test",
            ATTRIBUTES,
            UNIFORMS,
            UnresolvedInputPolicy::Reject,
        );

        assert_eq!(
            result,
            Err(ShaderError::UnresolvedInput {
                shader: "Test",
                name: "u_opacity"
            })
        );
    }
}
