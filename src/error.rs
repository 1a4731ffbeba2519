//! Error types for the backend and the shader family.

use crate::backend::types::TextureTarget;
use thiserror::Error;

/// Shader stage a compile error was reported for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to compile {stage} shader: {log}")]
    ShaderCompilationFailed { stage: ShaderStage, log: String },
    #[error("Failed to link program: {log}")]
    ProgramLinkFailed { log: String },
    #[error("Failed to create resource: {0}")]
    ResourceCreationFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by material shaders.
///
/// Construction errors leave no shader behind. Render errors abort only the
/// call that raised them; nothing has been sent to the backend at that point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShaderError {
    #[error("{shader}: failed to build GPU program")]
    CompileOrLink {
        shader: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("{shader}: input `{name}` was not found in the linked program")]
    UnresolvedInput {
        shader: &'static str,
        name: &'static str,
    },
    #[error("{shader}: {target} textures are not supported by this context")]
    UnsupportedTarget {
        shader: &'static str,
        target: TextureTarget,
    },
    #[error("{shader}::render: texture with wrong target (expected {expected}, got {actual})")]
    TextureTargetMismatch {
        shader: &'static str,
        expected: TextureTarget,
        actual: TextureTarget,
    },
    #[error("{shader}::render: material has no main texture")]
    MissingTexture { shader: &'static str },
    #[error("{shader}::render: mesh has no data for attribute `{attribute}`")]
    MissingVertexData {
        shader: &'static str,
        attribute: &'static str,
    },
    #[error("{shader}::render: no value supplied for uniform `{name}`")]
    MissingUniformValue {
        shader: &'static str,
        name: &'static str,
    },
    #[error("{shader}::render: failed to prepare vertex array")]
    VertexArray {
        shader: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("{shader}::render: shader has been recycled")]
    Recycled { shader: &'static str },
}

/// A graphics API error picked up by the post-draw check.
///
/// These are advisory: they are logged and handed back in the draw report,
/// never returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlError {
    pub code: u32,
    pub site: String,
}

impl GlError {
    pub const INVALID_ENUM: u32 = 0x0500;
    pub const INVALID_VALUE: u32 = 0x0501;
    pub const INVALID_OPERATION: u32 = 0x0502;
    pub const OUT_OF_MEMORY: u32 = 0x0505;
    pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

    pub fn name(&self) -> &'static str {
        match self.code {
            Self::INVALID_ENUM => "GL_INVALID_ENUM",
            Self::INVALID_VALUE => "GL_INVALID_VALUE",
            Self::INVALID_OPERATION => "GL_INVALID_OPERATION",
            Self::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            Self::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            _ => "unknown GL error",
        }
    }
}

impl std::fmt::Display for GlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} (0x{:04x})", self.site, self.name(), self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShaderError::TextureTargetMismatch {
            shader: "OesShader",
            expected: TextureTarget::ExternalOes,
            actual: TextureTarget::Texture2D,
        };
        assert_eq!(
            err.to_string(),
            "OesShader::render: texture with wrong target (expected external-oes, got 2d)"
        );

        let err = BackendError::ProgramLinkFailed {
            log: "varying mismatch".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to link program: varying mismatch");
    }

    #[test]
    fn test_gl_error_names() {
        let err = GlError {
            code: GlError::INVALID_OPERATION,
            site: "CubemapShader::render".to_string(),
        };
        assert_eq!(err.name(), "GL_INVALID_OPERATION");
        assert_eq!(
            err.to_string(),
            "CubemapShader::render: GL_INVALID_OPERATION (0x0502)"
        );

        let err = GlError {
            code: 0x1234,
            site: "x".to_string(),
        };
        assert_eq!(err.name(), "unknown GL error");
    }
}
