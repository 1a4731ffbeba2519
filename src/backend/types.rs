//! Common types shared between backends

/// GL enum values the shaders and backends agree on
pub mod gl {
    pub const TEXTURE_2D: u32 = 0x0DE1;
    pub const TEXTURE_CUBE_MAP: u32 = 0x8513;
    pub const TEXTURE_EXTERNAL_OES: u32 = 0x8D65;
    pub const NO_ERROR: u32 = 0;
}

/// Sampling convention of a texture resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    /// Flat 2D texture
    Texture2D,
    /// Six-face cube map
    CubeMap,
    /// Externally sourced image (hardware video decoder, camera)
    ExternalOes,
}

impl TextureTarget {
    pub const ALL: [TextureTarget; 3] = [
        TextureTarget::Texture2D,
        TextureTarget::CubeMap,
        TextureTarget::ExternalOes,
    ];

    pub fn gl_enum(&self) -> u32 {
        match self {
            TextureTarget::Texture2D => gl::TEXTURE_2D,
            TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
            TextureTarget::ExternalOes => gl::TEXTURE_EXTERNAL_OES,
        }
    }

    pub fn from_gl_enum(value: u32) -> Option<Self> {
        match value {
            gl::TEXTURE_2D => Some(TextureTarget::Texture2D),
            gl::TEXTURE_CUBE_MAP => Some(TextureTarget::CubeMap),
            gl::TEXTURE_EXTERNAL_OES => Some(TextureTarget::ExternalOes),
            _ => None,
        }
    }
}

impl std::fmt::Display for TextureTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureTarget::Texture2D => write!(f, "2d"),
            TextureTarget::CubeMap => write!(f, "cube-map"),
            TextureTarget::ExternalOes => write!(f, "external-oes"),
        }
    }
}

/// Features of the current context that affect how shaders feed the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Vertex array objects are available (GL ES 3.0 or OES_vertex_array_object)
    pub vertex_array_objects: bool,
    /// `samplerExternalOES` is available (OES_EGL_image_external)
    pub external_textures: bool,
}

impl Capabilities {
    /// GL ES 2.0 with external images but no vertex arrays
    pub const GLES2: Self = Self {
        vertex_array_objects: false,
        external_textures: true,
    };

    /// GL ES 3.0
    pub const GLES3: Self = Self {
        vertex_array_objects: true,
        external_textures: true,
    };

    /// Whether textures of `target` can be sampled in this context
    pub fn supports_target(&self, target: TextureTarget) -> bool {
        match target {
            TextureTarget::Texture2D | TextureTarget::CubeMap => true,
            TextureTarget::ExternalOes => self.external_textures,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::GLES3
    }
}

/// Location of a vertex attribute in a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttribLocation(pub u32);

/// Location of a uniform in a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u64);

impl UniformLocation {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_target_gl_enum_roundtrip() {
        for target in TextureTarget::ALL {
            assert_eq!(TextureTarget::from_gl_enum(target.gl_enum()), Some(target));
        }
        assert_eq!(TextureTarget::from_gl_enum(0), None);
    }

    #[test]
    fn test_capabilities_presets() {
        assert!(!Capabilities::GLES2.vertex_array_objects);
        assert!(Capabilities::GLES3.vertex_array_objects);
        assert_eq!(Capabilities::default(), Capabilities::GLES3);
    }

    #[test]
    fn test_supports_target() {
        let caps = Capabilities {
            external_textures: false,
            ..Capabilities::GLES3
        };
        assert!(caps.supports_target(TextureTarget::Texture2D));
        assert!(caps.supports_target(TextureTarget::CubeMap));
        assert!(!caps.supports_target(TextureTarget::ExternalOes));
        assert!(Capabilities::GLES2.supports_target(TextureTarget::ExternalOes));
    }
}
