//! GL ES backend on top of a [`glow::Context`].
//!
//! Handles given out by this backend index into per-kind tables so the
//! rest of the crate stays independent of glow's native/web types.
//!
//! All glow calls are `unsafe` because they require a current context on
//! the calling thread. `GlowBackend` holds an `Rc`, which keeps it on the
//! thread it was created on.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use glow::HasContext;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{BackendError, BackendResult, ShaderStage};

/// Uniform locations handed out per program.
///
/// Repeated lookups of one name return the same handle, and deleting a
/// program drops every location it owned.
struct UniformTable<L> {
    locations: HashMap<u64, L>,
    by_program: HashMap<u64, HashMap<String, u64>>,
}

impl<L> Default for UniformTable<L> {
    fn default() -> Self {
        Self {
            locations: HashMap::new(),
            by_program: HashMap::new(),
        }
    }
}

impl<L> UniformTable<L> {
    fn lookup(&self, program: u64, name: &str) -> Option<u64> {
        self.by_program.get(&program)?.get(name).copied()
    }

    fn insert(&mut self, id: u64, program: u64, name: &str, location: L) {
        self.locations.insert(id, location);
        self.by_program
            .entry(program)
            .or_default()
            .insert(name.to_string(), id);
    }

    fn get(&self, id: u64) -> Option<&L> {
        self.locations.get(&id)
    }

    fn remove_program(&mut self, program: u64) {
        if let Some(names) = self.by_program.remove(&program) {
            for id in names.into_values() {
                self.locations.remove(&id);
            }
        }
    }

    fn len(&self) -> usize {
        self.locations.len()
    }
}

#[derive(Default)]
struct Objects {
    programs: HashMap<u64, glow::Program>,
    textures: HashMap<u64, glow::Texture>,
    buffers: HashMap<u64, glow::Buffer>,
    vertex_arrays: HashMap<u64, glow::VertexArray>,
    uniforms: UniformTable<glow::UniformLocation>,
    /// Streaming buffers backing client-array attributes, per location
    scratch_attributes: HashMap<u32, glow::Buffer>,
    scratch_indices: Option<glow::Buffer>,
}

struct GlowState {
    gl: glow::Context,
    capabilities: Capabilities,
    next_id: Cell<u64>,
    objects: RefCell<Objects>,
}

/// GL ES backend
#[derive(Clone)]
pub struct GlowBackend {
    state: Rc<GlowState>,
}

impl std::fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowBackend")
            .field("capabilities", &self.state.capabilities)
            .finish_non_exhaustive()
    }
}

impl GlowBackend {
    /// Wrap a context that is current on this thread.
    pub fn new(gl: glow::Context) -> Self {
        let capabilities = detect_capabilities(&gl);
        log::debug!("GlowBackend: {:?}", capabilities);
        Self {
            state: Rc::new(GlowState {
                gl,
                capabilities,
                next_id: Cell::new(0),
                objects: RefCell::new(Objects::default()),
            }),
        }
    }

    /// Make a texture created elsewhere usable by materials.
    pub fn register_texture(&self, texture: glow::Texture) -> TextureHandle {
        let id = self.allocate_id();
        self.state.objects.borrow_mut().textures.insert(id, texture);
        TextureHandle(id)
    }

    /// Forget a registered texture; the GL object itself stays with its owner.
    pub fn unregister_texture(&self, texture: TextureHandle) {
        self.state.objects.borrow_mut().textures.remove(&texture.0);
    }

    pub fn gl(&self) -> &glow::Context {
        &self.state.gl
    }

    fn allocate_id(&self) -> u64 {
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        id
    }

    fn compile_stage(&self, kind: u32, stage: ShaderStage, source: &str) -> BackendResult<glow::Shader> {
        let gl = &self.state.gl;
        unsafe {
            let shader = gl
                .create_shader(kind)
                .map_err(BackendError::ResourceCreationFailed)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(BackendError::ShaderCompilationFailed { stage, log });
            }
            Ok(shader)
        }
    }

    fn scratch_buffer(&self, location: Option<u32>) -> Option<glow::Buffer> {
        let mut objects = self.state.objects.borrow_mut();
        let existing = match location {
            Some(location) => objects.scratch_attributes.get(&location).copied(),
            None => objects.scratch_indices,
        };
        if existing.is_some() {
            return existing;
        }

        let buffer = match unsafe { self.state.gl.create_buffer() } {
            Ok(buffer) => buffer,
            Err(err) => {
                log::error!("GlowBackend: failed to create streaming buffer: {}", err);
                return None;
            }
        };
        match location {
            Some(location) => {
                objects.scratch_attributes.insert(location, buffer);
            }
            None => objects.scratch_indices = Some(buffer),
        }
        Some(buffer)
    }
}

fn detect_capabilities(gl: &glow::Context) -> Capabilities {
    let version = gl.version();
    let extensions = gl.supported_extensions();
    Capabilities {
        vertex_array_objects: version.major >= 3
            || extensions.contains("GL_OES_vertex_array_object"),
        external_textures: extensions.contains("GL_OES_EGL_image_external"),
    }
}

impl GlBackend for GlowBackend {
    fn capabilities(&self) -> Capabilities {
        self.state.capabilities
    }

    fn create_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> BackendResult<ProgramHandle> {
        let gl = &self.state.gl;
        let vertex = self.compile_stage(glow::VERTEX_SHADER, ShaderStage::Vertex, vertex_source)?;
        let fragment =
            match self.compile_stage(glow::FRAGMENT_SHADER, ShaderStage::Fragment, fragment_source) {
                Ok(fragment) => fragment,
                Err(err) => {
                    unsafe { gl.delete_shader(vertex) };
                    return Err(err);
                }
            };

        unsafe {
            let program = gl
                .create_program()
                .map_err(BackendError::ResourceCreationFailed)?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);
            gl.delete_shader(vertex);
            gl.delete_shader(fragment);

            if !gl.get_program_link_status(program) {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(BackendError::ProgramLinkFailed { log });
            }

            let id = self.allocate_id();
            self.state.objects.borrow_mut().programs.insert(id, program);
            Ok(ProgramHandle(id))
        }
    }

    fn delete_program(&self, program: ProgramHandle) {
        let mut objects = self.state.objects.borrow_mut();
        objects.uniforms.remove_program(program.0);
        if let Some(program) = objects.programs.remove(&program.0) {
            unsafe { self.state.gl.delete_program(program) };
        }
        log::trace!("GlowBackend: {} uniform locations live", objects.uniforms.len());
    }

    fn use_program(&self, program: ProgramHandle) {
        let program = self.state.objects.borrow().programs.get(&program.0).copied();
        unsafe { self.state.gl.use_program(program) };
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        let program = self.state.objects.borrow().programs.get(&program.0).copied()?;
        unsafe { self.state.gl.get_attrib_location(program, name) }.map(AttribLocation)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let mut objects = self.state.objects.borrow_mut();
        if let Some(id) = objects.uniforms.lookup(program.0, name) {
            return Some(UniformLocation(id));
        }
        let native = objects.programs.get(&program.0).copied()?;
        let location = unsafe { self.state.gl.get_uniform_location(native, name) }?;
        let id = self.allocate_id();
        objects.uniforms.insert(id, program.0, name, location);
        Some(UniformLocation(id))
    }

    fn uniform_matrix4(&self, location: UniformLocation, value: &[f32; 16]) {
        let objects = self.state.objects.borrow();
        let location = objects.uniforms.get(location.0);
        unsafe {
            self.state
                .gl
                .uniform_matrix_4_f32_slice(location, false, value)
        };
    }

    fn uniform3f(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        let objects = self.state.objects.borrow();
        let location = objects.uniforms.get(location.0);
        unsafe { self.state.gl.uniform_3_f32(location, x, y, z) };
    }

    fn uniform1f(&self, location: UniformLocation, value: f32) {
        let objects = self.state.objects.borrow();
        let location = objects.uniforms.get(location.0);
        unsafe { self.state.gl.uniform_1_f32(location, value) };
    }

    fn uniform1i(&self, location: UniformLocation, value: i32) {
        let objects = self.state.objects.borrow();
        let location = objects.uniforms.get(location.0);
        unsafe { self.state.gl.uniform_1_i32(location, value) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.state.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture(&self, target: TextureTarget, texture: TextureHandle) {
        let texture = self.state.objects.borrow().textures.get(&texture.0).copied();
        if texture.is_none() {
            log::warn!("GlowBackend: binding unregistered texture to {}", target);
        }
        unsafe { self.state.gl.bind_texture(target.gl_enum(), texture) };
    }

    fn create_buffer(&self) -> BackendResult<BufferHandle> {
        let buffer = unsafe { self.state.gl.create_buffer() }
            .map_err(BackendError::ResourceCreationFailed)?;
        let id = self.allocate_id();
        self.state.objects.borrow_mut().buffers.insert(id, buffer);
        Ok(BufferHandle(id))
    }

    fn upload_vertex_data(&self, buffer: BufferHandle, data: &[f32]) {
        let buffer = self.state.objects.borrow().buffers.get(&buffer.0).copied();
        let gl = &self.state.gl;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, buffer);
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
        }
    }

    fn upload_index_data(&self, buffer: BufferHandle, data: &[u16]) {
        let buffer = self.state.objects.borrow().buffers.get(&buffer.0).copied();
        let gl = &self.state.gl;
        unsafe {
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer);
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        if let Some(buffer) = self.state.objects.borrow_mut().buffers.remove(&buffer.0) {
            unsafe { self.state.gl.delete_buffer(buffer) };
        }
    }

    fn create_vertex_array(&self) -> BackendResult<VertexArrayHandle> {
        if !self.state.capabilities.vertex_array_objects {
            return Err(BackendError::ResourceCreationFailed(
                "vertex array objects are not supported by this context".to_string(),
            ));
        }
        let vertex_array = unsafe { self.state.gl.create_vertex_array() }
            .map_err(BackendError::ResourceCreationFailed)?;
        let id = self.allocate_id();
        self.state
            .objects
            .borrow_mut()
            .vertex_arrays
            .insert(id, vertex_array);
        Ok(VertexArrayHandle(id))
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        let vertex_array = vertex_array.and_then(|vertex_array| {
            self.state
                .objects
                .borrow()
                .vertex_arrays
                .get(&vertex_array.0)
                .copied()
        });
        unsafe { self.state.gl.bind_vertex_array(vertex_array) };
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        let removed = self
            .state
            .objects
            .borrow_mut()
            .vertex_arrays
            .remove(&vertex_array.0);
        if let Some(vertex_array) = removed {
            unsafe { self.state.gl.delete_vertex_array(vertex_array) };
        }
    }

    fn vertex_attrib_buffer(&self, location: AttribLocation, components: u32, buffer: BufferHandle) {
        let buffer = self.state.objects.borrow().buffers.get(&buffer.0).copied();
        let gl = &self.state.gl;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, buffer);
            gl.vertex_attrib_pointer_f32(location.0, components as i32, glow::FLOAT, false, 0, 0);
        }
    }

    fn vertex_attrib_slice(&self, location: AttribLocation, components: u32, data: &[f32]) {
        // glow has no client-side pointers; stream the slice instead.
        let Some(buffer) = self.scratch_buffer(Some(location.0)) else {
            return;
        };
        let gl = &self.state.gl;
        unsafe {
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STREAM_DRAW,
            );
            gl.vertex_attrib_pointer_f32(location.0, components as i32, glow::FLOAT, false, 0, 0);
        }
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        unsafe { self.state.gl.enable_vertex_attrib_array(location.0) };
    }

    fn bind_index_buffer(&self, buffer: BufferHandle) {
        let buffer = self.state.objects.borrow().buffers.get(&buffer.0).copied();
        unsafe { self.state.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer) };
    }

    fn draw_elements_buffer(&self, count: u32) {
        unsafe {
            self.state
                .gl
                .draw_elements(glow::TRIANGLES, count as i32, glow::UNSIGNED_SHORT, 0)
        };
    }

    fn draw_elements_slice(&self, indices: &[u16]) {
        let Some(buffer) = self.scratch_buffer(None) else {
            return;
        };
        let gl = &self.state.gl;
        unsafe {
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STREAM_DRAW,
            );
            gl.draw_elements(
                glow::TRIANGLES,
                indices.len() as i32,
                glow::UNSIGNED_SHORT,
                0,
            );
        }
    }

    fn get_error(&self) -> Option<u32> {
        match unsafe { self.state.gl.get_error() } {
            glow::NO_ERROR => None,
            code => Some(code),
        }
    }
}

impl Drop for GlowState {
    fn drop(&mut self) {
        let objects = self.objects.get_mut();
        unsafe {
            for buffer in objects.scratch_attributes.values() {
                self.gl.delete_buffer(*buffer);
            }
            if let Some(buffer) = objects.scratch_indices {
                self.gl.delete_buffer(buffer);
            }
        }
    }
}
