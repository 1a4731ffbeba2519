//! Recording GL backend for testing and headless runs.
//!
//! This backend doesn't touch a GPU. It records every call as a
//! [`GlCommand`] and imitates the parts of a GL ES driver the shaders
//! depend on: program linking, location assignment for declared inputs,
//! and the error queue.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::error::{BackendError, BackendResult};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum GlCommand {
    CreateProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(ProgramHandle),
    UniformMatrix4 {
        location: UniformLocation,
        value: [f32; 16],
    },
    Uniform3f {
        location: UniformLocation,
        value: [f32; 3],
    },
    Uniform1f {
        location: UniformLocation,
        value: f32,
    },
    Uniform1i {
        location: UniformLocation,
        value: i32,
    },
    ActiveTexture(u32),
    BindTexture {
        target: TextureTarget,
        texture: TextureHandle,
    },
    CreateBuffer(BufferHandle),
    UploadVertexData {
        buffer: BufferHandle,
        len: usize,
    },
    UploadIndexData {
        buffer: BufferHandle,
        len: usize,
    },
    DeleteBuffer(BufferHandle),
    CreateVertexArray(VertexArrayHandle),
    BindVertexArray(Option<VertexArrayHandle>),
    DeleteVertexArray(VertexArrayHandle),
    VertexAttribBuffer {
        location: AttribLocation,
        components: u32,
        buffer: BufferHandle,
    },
    VertexAttribSlice {
        location: AttribLocation,
        components: u32,
        len: usize,
    },
    EnableVertexAttribArray(AttribLocation),
    BindIndexBuffer(BufferHandle),
    DrawElements {
        count: u32,
        client_indices: bool,
    },
}

impl GlCommand {
    pub fn is_draw(&self) -> bool {
        matches!(self, GlCommand::DrawElements { .. })
    }
}

#[derive(Debug, Default)]
struct LinkedProgram {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Debug)]
struct RecorderState {
    capabilities: Capabilities,
    next_id: u64,
    programs: HashMap<u64, LinkedProgram>,
    buffers: HashSet<u64>,
    vertex_arrays: HashSet<u64>,
    optimized_out: HashSet<String>,
    pending_link_failure: Option<String>,
    buffer_budget: Option<usize>,
    pending_errors: VecDeque<u32>,
    commands: Vec<GlCommand>,
}

impl RecorderState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Recording backend.
///
/// Clones share the same recorder, the way clones of a real context share
/// the same driver state.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    state: Rc<RefCell<RecorderState>>,
}

impl RecordingBackend {
    /// Create a backend reporting GL ES 3.0 capabilities.
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::GLES3)
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            state: Rc::new(RefCell::new(RecorderState {
                capabilities,
                next_id: 0,
                programs: HashMap::new(),
                buffers: HashSet::new(),
                vertex_arrays: HashSet::new(),
                optimized_out: HashSet::new(),
                pending_link_failure: None,
                buffer_budget: None,
                pending_errors: VecDeque::new(),
                commands: Vec::new(),
            })),
        }
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Recording Backend"
    }

    /// Treat `name` as eliminated by the linker in programs linked from now on.
    pub fn optimize_out(&self, name: &str) {
        self.state.borrow_mut().optimized_out.insert(name.to_string());
    }

    /// Make the next `create_program` call fail with the given link log.
    pub fn fail_next_link(&self, log: &str) {
        self.state.borrow_mut().pending_link_failure = Some(log.to_string());
    }

    /// Let the next `count` buffer creations succeed and fail every one after.
    pub fn fail_buffers_after(&self, count: usize) {
        self.state.borrow_mut().buffer_budget = Some(count);
    }

    /// Queue an error code to be returned by `get_error`.
    pub fn inject_error(&self, code: u32) {
        self.state.borrow_mut().pending_errors.push_back(code);
    }

    /// Register an externally created texture and get a handle for it.
    pub fn create_texture(&self) -> TextureHandle {
        TextureHandle(self.state.borrow_mut().allocate_id())
    }

    /// All commands recorded so far.
    pub fn commands(&self) -> Vec<GlCommand> {
        self.state.borrow().commands.clone()
    }

    /// Forget recorded commands; driver state is kept.
    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    /// Element counts of every draw recorded so far.
    pub fn draw_counts(&self) -> Vec<u32> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter_map(|command| match command {
                GlCommand::DrawElements { count, .. } => Some(*count),
                _ => None,
            })
            .collect()
    }

    pub fn count_commands(&self, predicate: impl Fn(&GlCommand) -> bool) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|command| predicate(command))
            .count()
    }

    /// Number of programs linked and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.state.borrow().vertex_arrays.len()
    }

    fn record(&self, command: GlCommand) {
        log::trace!("RecordingBackend: {:?}", command);
        self.state.borrow_mut().commands.push(command);
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Names of `attribute` and `uniform` declarations, in declaration order.
fn declared_inputs(source: &str, keyword: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some(keyword) {
                return None;
            }
            tokens
                .last()
                .map(|name| name.trim_end_matches(';').to_string())
        })
        .collect()
}

impl GlBackend for RecordingBackend {
    fn capabilities(&self) -> Capabilities {
        self.state.borrow().capabilities
    }

    fn create_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> BackendResult<ProgramHandle> {
        let mut state = self.state.borrow_mut();
        if let Some(log) = state.pending_link_failure.take() {
            return Err(BackendError::ProgramLinkFailed { log });
        }

        let mut linked = LinkedProgram::default();
        for name in declared_inputs(vertex_source, "attribute") {
            if !state.optimized_out.contains(&name) && !linked.attributes.contains(&name) {
                linked.attributes.push(name);
            }
        }
        for name in declared_inputs(vertex_source, "uniform")
            .into_iter()
            .chain(declared_inputs(fragment_source, "uniform"))
        {
            if !state.optimized_out.contains(&name) && !linked.uniforms.contains(&name) {
                linked.uniforms.push(name);
            }
        }

        let id = state.allocate_id();
        state.programs.insert(id, linked);
        drop(state);

        let program = ProgramHandle(id);
        self.record(GlCommand::CreateProgram(program));
        Ok(program)
    }

    fn delete_program(&self, program: ProgramHandle) {
        self.state.borrow_mut().programs.remove(&program.0);
        self.record(GlCommand::DeleteProgram(program));
    }

    fn use_program(&self, program: ProgramHandle) {
        self.record(GlCommand::UseProgram(program));
    }

    fn attrib_location(&self, program: ProgramHandle, name: &str) -> Option<AttribLocation> {
        let state = self.state.borrow();
        let linked = state.programs.get(&program.0)?;
        linked
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| AttribLocation(index as u32))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let state = self.state.borrow();
        let linked = state.programs.get(&program.0)?;
        linked
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| UniformLocation(index as u64))
    }

    fn uniform_matrix4(&self, location: UniformLocation, value: &[f32; 16]) {
        self.record(GlCommand::UniformMatrix4 {
            location,
            value: *value,
        });
    }

    fn uniform3f(&self, location: UniformLocation, x: f32, y: f32, z: f32) {
        self.record(GlCommand::Uniform3f {
            location,
            value: [x, y, z],
        });
    }

    fn uniform1f(&self, location: UniformLocation, value: f32) {
        self.record(GlCommand::Uniform1f { location, value });
    }

    fn uniform1i(&self, location: UniformLocation, value: i32) {
        self.record(GlCommand::Uniform1i { location, value });
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCommand::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: TextureTarget, texture: TextureHandle) {
        self.record(GlCommand::BindTexture { target, texture });
    }

    fn create_buffer(&self) -> BackendResult<BufferHandle> {
        let buffer = {
            let mut state = self.state.borrow_mut();
            if let Some(remaining) = state.buffer_budget.as_mut() {
                if *remaining == 0 {
                    return Err(BackendError::ResourceCreationFailed(
                        "out of buffer memory".to_string(),
                    ));
                }
                *remaining -= 1;
            }
            let id = state.allocate_id();
            state.buffers.insert(id);
            BufferHandle(id)
        };
        self.record(GlCommand::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn upload_vertex_data(&self, buffer: BufferHandle, data: &[f32]) {
        self.record(GlCommand::UploadVertexData {
            buffer,
            len: data.len(),
        });
    }

    fn upload_index_data(&self, buffer: BufferHandle, data: &[u16]) {
        self.record(GlCommand::UploadIndexData {
            buffer,
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        self.state.borrow_mut().buffers.remove(&buffer.0);
        self.record(GlCommand::DeleteBuffer(buffer));
    }

    fn create_vertex_array(&self) -> BackendResult<VertexArrayHandle> {
        let vertex_array = {
            let mut state = self.state.borrow_mut();
            if !state.capabilities.vertex_array_objects {
                return Err(BackendError::ResourceCreationFailed(
                    "vertex array objects are not supported by this context".to_string(),
                ));
            }
            let id = state.allocate_id();
            state.vertex_arrays.insert(id);
            VertexArrayHandle(id)
        };
        self.record(GlCommand::CreateVertexArray(vertex_array));
        Ok(vertex_array)
    }

    fn bind_vertex_array(&self, vertex_array: Option<VertexArrayHandle>) {
        self.record(GlCommand::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        self.state.borrow_mut().vertex_arrays.remove(&vertex_array.0);
        self.record(GlCommand::DeleteVertexArray(vertex_array));
    }

    fn vertex_attrib_buffer(&self, location: AttribLocation, components: u32, buffer: BufferHandle) {
        self.record(GlCommand::VertexAttribBuffer {
            location,
            components,
            buffer,
        });
    }

    fn vertex_attrib_slice(&self, location: AttribLocation, components: u32, data: &[f32]) {
        self.record(GlCommand::VertexAttribSlice {
            location,
            components,
            len: data.len(),
        });
    }

    fn enable_vertex_attrib_array(&self, location: AttribLocation) {
        self.record(GlCommand::EnableVertexAttribArray(location));
    }

    fn bind_index_buffer(&self, buffer: BufferHandle) {
        self.record(GlCommand::BindIndexBuffer(buffer));
    }

    fn draw_elements_buffer(&self, count: u32) {
        self.record(GlCommand::DrawElements {
            count,
            client_indices: false,
        });
    }

    fn draw_elements_slice(&self, indices: &[u16]) {
        self.record(GlCommand::DrawElements {
            count: indices.len() as u32,
            client_indices: true,
        });
    }

    fn get_error(&self) -> Option<u32> {
        self.state.borrow_mut().pending_errors.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "attribute vec4 a_position;\nuniform mat4 u_mvp;\nvoid main() {}\n";
    const FRAGMENT: &str = "precision highp float;\nuniform vec3 u_color;\nuniform mat4 u_mvp;\nvoid main() {}\n";

    #[test]
    fn test_declared_inputs_parsing() {
        assert_eq!(declared_inputs(VERTEX, "attribute"), vec!["a_position"]);
        assert_eq!(declared_inputs(FRAGMENT, "uniform"), vec!["u_color", "u_mvp"]);
        assert!(declared_inputs(FRAGMENT, "attribute").is_empty());
    }

    #[test]
    fn test_locations_follow_declarations() {
        let backend = RecordingBackend::new();
        let program = backend.create_program(VERTEX, FRAGMENT).unwrap();

        assert_eq!(
            backend.attrib_location(program, "a_position"),
            Some(AttribLocation(0))
        );
        assert!(backend.uniform_location(program, "u_mvp").is_some());
        assert!(backend.uniform_location(program, "u_color").is_some());
        assert_eq!(backend.uniform_location(program, "u_opacity"), None);
    }

    #[test]
    fn test_optimized_out_inputs_are_not_found() {
        let backend = RecordingBackend::new();
        backend.optimize_out("u_color");
        let program = backend.create_program(VERTEX, FRAGMENT).unwrap();

        assert_eq!(backend.uniform_location(program, "u_color"), None);
        assert!(backend.uniform_location(program, "u_mvp").is_some());
    }

    #[test]
    fn test_link_failure_is_one_shot() {
        let backend = RecordingBackend::new();
        backend.fail_next_link("boom");

        assert_eq!(
            backend.create_program(VERTEX, FRAGMENT),
            Err(BackendError::ProgramLinkFailed {
                log: "boom".to_string()
            })
        );
        assert!(backend.create_program(VERTEX, FRAGMENT).is_ok());
        assert_eq!(backend.live_programs(), 1);
    }

    #[test]
    fn test_error_queue_order() {
        let backend = RecordingBackend::new();
        backend.inject_error(0x0500);
        backend.inject_error(0x0502);

        assert_eq!(backend.get_error(), Some(0x0500));
        assert_eq!(backend.get_error(), Some(0x0502));
        assert_eq!(backend.get_error(), None);
    }

    #[test]
    fn test_vertex_arrays_need_capability() {
        let backend = RecordingBackend::with_capabilities(Capabilities::GLES2);
        assert!(backend.create_vertex_array().is_err());

        let backend = RecordingBackend::new();
        let vao = backend.create_vertex_array().unwrap();
        assert_eq!(backend.live_vertex_arrays(), 1);
        backend.delete_vertex_array(vao);
        assert_eq!(backend.live_vertex_arrays(), 0);
    }

    #[test]
    fn test_buffer_budget() {
        let backend = RecordingBackend::new();
        backend.fail_buffers_after(1);
        assert!(backend.create_buffer().is_ok());
        assert!(matches!(
            backend.create_buffer(),
            Err(BackendError::ResourceCreationFailed(_))
        ));
        assert_eq!(backend.live_buffers(), 1);
    }

    #[test]
    fn test_clones_share_recorder() {
        let backend = RecordingBackend::new();
        let clone = backend.clone();
        clone.draw_elements_slice(&[0, 1, 2]);

        assert_eq!(backend.draw_counts(), vec![3]);
        backend.clear_commands();
        assert!(clone.commands().is_empty());
    }
}
