//! GLSL ES 1.00 source generation for material shaders.

use super::names::{InputKind, ShaderInput};

/// GLSL type of a declared input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlslType {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Sampler2D,
    SamplerCube,
    SamplerExternalOes,
}

impl GlslType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlslType::Int => "int",
            GlslType::Float => "float",
            GlslType::Vec2 => "vec2",
            GlslType::Vec3 => "vec3",
            GlslType::Vec4 => "vec4",
            GlslType::Mat4 => "mat4",
            GlslType::Sampler2D => "sampler2D",
            GlslType::SamplerCube => "samplerCube",
            GlslType::SamplerExternalOes => "samplerExternalOES",
        }
    }
}

/// One `attribute`/`uniform`/`varying` line of a shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration {
    pub input: ShaderInput,
    pub ty: GlslType,
}

impl Declaration {
    pub const fn new(input: ShaderInput, ty: GlslType) -> Self {
        Self { input, ty }
    }

    fn line(&self) -> String {
        let qualifier = match self.input.kind() {
            InputKind::Attribute => "attribute",
            InputKind::Uniform => "uniform",
            InputKind::Varying => "varying",
        };
        format!("{} {} {};", qualifier, self.ty.as_str(), self.input.name())
    }
}

/// Everything needed to generate one shader stage
#[derive(Debug, Clone, Copy)]
pub struct StageTemplate {
    /// Lines emitted before declarations (extensions, precision)
    pub header: &'static [&'static str],
    pub declarations: &'static [Declaration],
}

/// Immutable vertex/fragment source pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    /// Generate both stages; bodies are the statements inside `main`.
    pub fn generate(
        vertex: &StageTemplate,
        vertex_body: &str,
        fragment: &StageTemplate,
        fragment_body: &str,
    ) -> Self {
        Self {
            vertex: generate_stage(vertex, vertex_body),
            fragment: generate_stage(fragment, fragment_body),
        }
    }
}

fn generate_stage(template: &StageTemplate, body: &str) -> String {
    let mut source = String::new();
    for line in template.header {
        source.push_str(line);
        source.push('\n');
    }
    for declaration in template.declarations {
        source.push_str(&declaration.line());
        source.push('\n');
    }
    source.push_str("void main() {\n");
    for statement in body.lines().filter(|line| !line.trim().is_empty()) {
        source.push_str("  ");
        source.push_str(statement.trim());
        source.push('\n');
    }
    source.push_str("}\n");
    source
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: StageTemplate = StageTemplate {
        header: &[],
        declarations: &[
            Declaration::new(ShaderInput::Position, GlslType::Vec4),
            Declaration::new(ShaderInput::ModelViewProjection, GlslType::Mat4),
        ],
    };

    const FRAGMENT: StageTemplate = StageTemplate {
        header: &["precision highp float;"],
        declarations: &[Declaration::new(ShaderInput::Opacity, GlslType::Float)],
    };

    #[test]
    fn test_generate_stage_layout() {
        let source = ShaderSource::generate(
            &VERTEX,
            "gl_Position = u_mvp * a_position;",
            &FRAGMENT,
            "gl_FragColor = vec4(u_opacity);",
        );

        assert_eq!(
            source.vertex,
            "attribute vec4 a_position;\nuniform mat4 u_mvp;\nvoid main() {\n  gl_Position = u_mvp * a_position;\n}\n"
        );
        assert!(source.fragment.starts_with("precision highp float;\nuniform float u_opacity;\n"));
    }

    #[test]
    fn test_body_lines_are_reindented() {
        let source = ShaderSource::generate(&VERTEX, "\n    a;\n\n      b;\n", &FRAGMENT, "");
        assert!(source.vertex.ends_with("void main() {\n  a;\n  b;\n}\n"));
        assert!(source.fragment.ends_with("void main() {\n}\n"));
    }
}
