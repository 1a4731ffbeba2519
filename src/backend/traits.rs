//! Core backend abstraction traits
//!
//! [`GlBackend`] is the GL ES surface the material shaders are written
//! against. Both the recording backend and the glow backend implement it.

use crate::backend::types::*;
use crate::error::BackendResult;

/// Handle to a linked GPU program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u64);

/// Handle to a texture object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub(crate) u64);

macro_rules! impl_raw_handle {
    ($($handle:ident),*) => {
        $(
            impl $handle {
                pub fn raw(&self) -> u64 {
                    self.0
                }
            }
        )*
    };
}

impl_raw_handle!(ProgramHandle, TextureHandle, BufferHandle, VertexArrayHandle);

/// GL ES graphics backend.
///
/// Implementations are cheap clonable handles to one graphics context. Every
/// call must happen on the thread that owns that context; implementors are
/// expected to be `!Send` to enforce that.
pub trait GlBackend: Clone {
    /// Features of the context
    fn capabilities(&self) -> Capabilities;

    // Programs

    /// Compile both stages and link them into a program
    fn create_program(&self, vertex_source: &str, fragment_source: &str)
        -> BackendResult<ProgramHandle>;

    /// Release a program
    fn delete_program(&self, program: ProgramHandle);

    /// Make a program current
    fn use_program(&self, program: ProgramHandle);

    /// Look up an attribute; `None` when the linker dropped or never saw it
    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation>;

    /// Look up a uniform; `None` when the linker dropped or never saw it
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    // Uniforms (apply to the current program)

    /// Upload a column-major 4x4 matrix
    fn uniform_matrix4(&self, location: UniformLocation, value: &[f32; 16]);

    fn uniform3f(&self, location: UniformLocation, x: f32, y: f32, z: f32);

    fn uniform1f(&self, location: UniformLocation, value: f32);

    fn uniform1i(&self, location: UniformLocation, value: i32);

    // Textures

    /// Select the active texture unit (0-based)
    fn active_texture(&self, unit: u32);

    /// Bind a texture to the active unit
    fn bind_texture(&self, target: TextureTarget, texture: TextureHandle);

    // Buffers

    fn create_buffer(&self) -> BackendResult<BufferHandle>;

    /// Upload static vertex data (bound as an array buffer)
    fn upload_vertex_data(&self, buffer: BufferHandle, data: &[f32]);

    /// Upload static index data (bound as an element array buffer)
    fn upload_index_data(&self, buffer: BufferHandle, data: &[u16]);

    fn delete_buffer(&self, buffer: BufferHandle);

    // Vertex arrays

    fn create_vertex_array(&self) -> BackendResult<VertexArrayHandle>;

    /// Bind a vertex array, or unbind with `None`
    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>);

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle);

    /// Point an attribute at a tightly packed float buffer
    fn vertex_attrib_buffer(&self, location: AttribLocation, components: u32, buffer: BufferHandle);

    /// Feed an attribute from a client-side float slice for the next draw
    fn vertex_attrib_slice(&self, location: AttribLocation, components: u32, data: &[f32]);

    fn enable_vertex_attrib_array(&self, location: AttribLocation);

    /// Bind an index buffer into the current vertex array
    fn bind_index_buffer(&self, buffer: BufferHandle);

    // Draws

    /// Indexed triangle list from the bound index buffer, starting at offset 0
    fn draw_elements_buffer(&self, count: u32);

    /// Indexed triangle list from a client-side index slice
    fn draw_elements_slice(&self, indices: &[u16]);

    // Diagnostics

    /// Pop the oldest pending error, if any
    fn get_error(&self) -> Option<u32>;
}
