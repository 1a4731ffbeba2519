//! How vertex data reaches the GPU for a draw.

use crate::backend::{Capabilities, GlBackend, VertexArrayHandle};
use crate::error::BackendResult;
use crate::resources::{Mesh, VertexWiring};

use super::bindings::InputBindings;

/// Vertex submission strategy, fixed when a shader is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPath {
    /// Cached vertex array objects over static buffers (GL ES 3.0, OES_vertex_array_object)
    VertexArray,
    /// Raw client-side slices supplied on every draw (GL ES 2.0)
    ClientArrays,
}

impl DrawPath {
    /// Pick the best path the context supports.
    pub fn detect(capabilities: Capabilities) -> Self {
        if capabilities.vertex_array_objects {
            DrawPath::VertexArray
        } else {
            DrawPath::ClientArrays
        }
    }

    /// Create whatever GPU objects the draw needs before the program is bound.
    ///
    /// For the vertex-array path this uploads the mesh and builds the VAO for
    /// the shader's attribute wiring on first use.
    pub(crate) fn prepare<B: GlBackend>(
        &self,
        backend: &B,
        bindings: &InputBindings,
        mesh: &Mesh,
    ) -> BackendResult<PreparedDraw> {
        match self {
            DrawPath::VertexArray => {
                let mut wiring = VertexWiring::default();
                for (input, location) in bindings.attributes() {
                    wiring.set(input, location);
                }
                Ok(PreparedDraw::VertexArray(mesh.vertex_array(backend, wiring)?))
            }
            DrawPath::ClientArrays => Ok(PreparedDraw::ClientArrays),
        }
    }
}

impl std::fmt::Display for DrawPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawPath::VertexArray => write!(f, "vertex-array"),
            DrawPath::ClientArrays => write!(f, "client-arrays"),
        }
    }
}

/// A draw whose vertex inputs are ready to be wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreparedDraw {
    VertexArray(VertexArrayHandle),
    ClientArrays,
}

impl PreparedDraw {
    /// Wire attributes and issue the indexed triangle draw. Returns the
    /// element count.
    pub(crate) fn draw<B: GlBackend>(
        self,
        backend: &B,
        bindings: &InputBindings,
        mesh: &Mesh,
    ) -> u32 {
        let count = mesh.index_count() as u32;
        match self {
            PreparedDraw::VertexArray(vertex_array) => {
                backend.bind_vertex_array(Some(vertex_array));
                backend.draw_elements_buffer(count);
                backend.bind_vertex_array(None);
            }
            PreparedDraw::ClientArrays => {
                for (input, location) in bindings.attributes() {
                    backend.vertex_attrib_slice(
                        location,
                        input.components(),
                        mesh.attribute_data(input),
                    );
                    backend.enable_vertex_attrib_array(location);
                }
                backend.draw_elements_slice(mesh.triangles());
            }
        }
        count
    }
}
