//! Texture references as seen by materials

use crate::backend::traits::TextureHandle;
use crate::backend::types::TextureTarget;

/// A texture object plus the target it was created for.
///
/// Creation and upload are owned elsewhere; materials only carry the handle
/// and the tag the shaders validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    handle: TextureHandle,
    target: TextureTarget,
}

impl Texture {
    pub fn new(handle: TextureHandle, target: TextureTarget) -> Self {
        Self { handle, target }
    }

    pub fn texture_2d(handle: TextureHandle) -> Self {
        Self::new(handle, TextureTarget::Texture2D)
    }

    pub fn cube_map(handle: TextureHandle) -> Self {
        Self::new(handle, TextureTarget::CubeMap)
    }

    pub fn external(handle: TextureHandle) -> Self {
        Self::new(handle, TextureTarget::ExternalOes)
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    pub fn target(&self) -> TextureTarget {
        self.target
    }
}
