//! Compiled and linked GPU program.

use crate::backend::{GlBackend, ProgramHandle};
use crate::error::BackendResult;

use super::source::ShaderSource;

/// A linked vertex/fragment program.
///
/// The program is deleted exactly once, when this value is dropped.
pub struct GpuProgram<B: GlBackend> {
    backend: B,
    handle: ProgramHandle,
}

impl<B: GlBackend> GpuProgram<B> {
    /// Compile and link a source pair on the backend's context.
    pub fn compile(backend: &B, source: &ShaderSource) -> BackendResult<Self> {
        let handle = backend.create_program(&source.vertex, &source.fragment)?;
        Ok(Self {
            backend: backend.clone(),
            handle,
        })
    }

    pub fn id(&self) -> ProgramHandle {
        self.handle
    }
}

impl<B: GlBackend> Drop for GpuProgram<B> {
    fn drop(&mut self) {
        log::trace!("GpuProgram: deleting program {}", self.handle.raw());
        self.backend.delete_program(self.handle);
    }
}

impl<B: GlBackend> std::fmt::Debug for GpuProgram<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuProgram")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GlCommand, RecordingBackend};

    fn source() -> ShaderSource {
        ShaderSource {
            vertex: "attribute vec4 a_position;\nvoid main() {\n}\n".to_string(),
            fragment: "precision highp float;\nvoid main() {\n}\n".to_string(),
        }
    }

    #[test]
    fn test_program_deleted_once_on_drop() {
        let backend = RecordingBackend::new();
        let program = GpuProgram::compile(&backend, &source()).unwrap();
        let handle = program.id();
        assert_eq!(backend.live_programs(), 1);

        drop(program);
        assert_eq!(backend.live_programs(), 0);
        assert_eq!(
            backend.count_commands(|command| *command == GlCommand::DeleteProgram(handle)),
            1
        );
    }

    #[test]
    fn test_link_failure_propagates() {
        let backend = RecordingBackend::new();
        backend.fail_next_link("missing main");
        assert!(GpuProgram::compile(&backend, &source()).is_err());
        assert_eq!(backend.live_programs(), 0);
    }
}
