//! Mesh data structures, generation, and vertex-array caching

use std::cell::RefCell;
use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::backend::traits::*;
use crate::backend::types::AttribLocation;
use crate::error::BackendResult;
use crate::shaders::names::ShaderInput;

/// Attribute slots a shader wants mesh data fed into.
///
/// Meshes cache one vertex array object per distinct wiring, so shaders
/// whose programs assign different locations never share a stale VAO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexWiring {
    pub position: Option<AttribLocation>,
    pub normal: Option<AttribLocation>,
    pub tex_coord: Option<AttribLocation>,
}

impl VertexWiring {
    pub fn set(&mut self, input: ShaderInput, location: AttribLocation) {
        match input {
            ShaderInput::Position => self.position = Some(location),
            ShaderInput::Normal => self.normal = Some(location),
            ShaderInput::TexCoord => self.tex_coord = Some(location),
            _ => {}
        }
    }

    /// Wired slots with their attribute input
    pub fn slots(&self) -> impl Iterator<Item = (ShaderInput, AttribLocation)> {
        [
            (ShaderInput::Position, self.position),
            (ShaderInput::Normal, self.normal),
            (ShaderInput::TexCoord, self.tex_coord),
        ]
        .into_iter()
        .filter_map(|(input, location)| location.map(|location| (input, location)))
    }
}

#[derive(Debug, Clone, Copy)]
struct MeshBuffers {
    positions: BufferHandle,
    normals: Option<BufferHandle>,
    tex_coords: Option<BufferHandle>,
    indices: BufferHandle,
}

impl MeshBuffers {
    fn attribute(&self, input: ShaderInput) -> Option<BufferHandle> {
        match input {
            ShaderInput::Position => Some(self.positions),
            ShaderInput::Normal => self.normals,
            ShaderInput::TexCoord => self.tex_coords,
            _ => None,
        }
    }

    fn all(&self) -> impl Iterator<Item = BufferHandle> {
        [Some(self.positions), self.normals, self.tex_coords, Some(self.indices)]
            .into_iter()
            .flatten()
    }
}

/// GPU objects derived from the mesh data
#[derive(Debug, Default)]
struct MeshGpuState {
    buffers: Option<MeshBuffers>,
    vertex_arrays: HashMap<VertexWiring, VertexArrayHandle>,
    stale_buffers: Vec<BufferHandle>,
    stale_vertex_arrays: Vec<VertexArrayHandle>,
}

impl MeshGpuState {
    fn invalidate(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            self.stale_buffers.extend(buffers.all());
        }
        self.stale_vertex_arrays
            .extend(self.vertex_arrays.drain().map(|(_, vertex_array)| vertex_array));
    }

    fn delete_stale<B: GlBackend>(&mut self, backend: &B) {
        for vertex_array in self.stale_vertex_arrays.drain(..) {
            backend.delete_vertex_array(vertex_array);
        }
        for buffer in self.stale_buffers.drain(..) {
            backend.delete_buffer(buffer);
        }
    }
}

/// An indexed triangle mesh.
///
/// Normals and texture coordinates are optional; when present they hold one
/// entry per vertex. GPU objects are created on first use by the
/// vertex-array draw path and must be freed with [`Mesh::release`].
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    triangles: Vec<u16>,
    gpu: RefCell<MeshGpuState>,
}

impl Clone for Mesh {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            vertices: self.vertices.clone(),
            normals: self.normals.clone(),
            tex_coords: self.tex_coords.clone(),
            triangles: self.triangles.clone(),
            gpu: RefCell::default(),
        }
    }
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertices: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            triangles: Vec::new(),
            gpu: RefCell::default(),
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[Vec2] {
        &self.tex_coords
    }

    /// Triangle list indices, three per triangle
    pub fn triangles(&self) -> &[u16] {
        &self.triangles
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
        self.gpu.get_mut().invalidate();
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) {
        self.normals = normals;
        self.gpu.get_mut().invalidate();
    }

    pub fn set_tex_coords(&mut self, tex_coords: Vec<Vec2>) {
        self.tex_coords = tex_coords;
        self.gpu.get_mut().invalidate();
    }

    pub fn set_triangles(&mut self, triangles: Vec<u16>) {
        self.triangles = triangles;
        self.gpu.get_mut().invalidate();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Whether the mesh holds per-vertex data for an attribute input
    pub fn has_attribute(&self, input: ShaderInput) -> bool {
        let len = match input {
            ShaderInput::Position => self.vertices.len(),
            ShaderInput::Normal => self.normals.len(),
            ShaderInput::TexCoord => self.tex_coords.len(),
            _ => return false,
        };
        len > 0 && len == self.vertices.len()
    }

    /// Tightly packed floats for an attribute input
    pub fn attribute_data(&self, input: ShaderInput) -> &[f32] {
        match input {
            ShaderInput::Position => bytemuck::cast_slice(&self.vertices),
            ShaderInput::Normal => bytemuck::cast_slice(&self.normals),
            ShaderInput::TexCoord => bytemuck::cast_slice(&self.tex_coords),
            _ => &[],
        }
    }

    /// Get the vertex array for a wiring, creating buffers and the VAO on
    /// first request.
    pub fn vertex_array<B: GlBackend>(
        &self,
        backend: &B,
        wiring: VertexWiring,
    ) -> BackendResult<VertexArrayHandle> {
        let mut gpu = self.gpu.borrow_mut();
        gpu.delete_stale(backend);

        if let Some(vertex_array) = gpu.vertex_arrays.get(&wiring) {
            return Ok(*vertex_array);
        }

        let buffers = match gpu.buffers {
            Some(buffers) => buffers,
            None => {
                let buffers = self.upload_buffers(backend)?;
                gpu.buffers = Some(buffers);
                buffers
            }
        };

        let vertex_array = backend.create_vertex_array()?;
        backend.bind_vertex_array(Some(vertex_array));
        for (input, location) in wiring.slots() {
            if let Some(buffer) = buffers.attribute(input) {
                backend.vertex_attrib_buffer(location, input.components(), buffer);
                backend.enable_vertex_attrib_array(location);
            }
        }
        backend.bind_index_buffer(buffers.indices);
        backend.bind_vertex_array(None);

        log::debug!(
            "Mesh '{}': created vertex array {} for {:?}",
            self.name,
            vertex_array.raw(),
            wiring
        );
        gpu.vertex_arrays.insert(wiring, vertex_array);
        Ok(vertex_array)
    }

    /// Number of vertex arrays currently cached
    pub fn cached_vertex_arrays(&self) -> usize {
        self.gpu.borrow().vertex_arrays.len()
    }

    /// Delete every GPU object created for this mesh.
    pub fn release<B: GlBackend>(&self, backend: &B) {
        let mut gpu = self.gpu.borrow_mut();
        gpu.invalidate();
        gpu.delete_stale(backend);
    }

    /// Create and fill every buffer, deleting the ones already created if a
    /// later creation fails.
    fn upload_buffers<B: GlBackend>(&self, backend: &B) -> BackendResult<MeshBuffers> {
        let mut created = Vec::new();
        self.create_buffers(backend, &mut created).inspect_err(|err| {
            log::warn!(
                "Mesh '{}': buffer upload failed ({}), deleting {} partial buffer(s)",
                self.name,
                err,
                created.len()
            );
            for buffer in created.drain(..) {
                backend.delete_buffer(buffer);
            }
        })
    }

    fn create_buffers<B: GlBackend>(
        &self,
        backend: &B,
        created: &mut Vec<BufferHandle>,
    ) -> BackendResult<MeshBuffers> {
        let mut create = || -> BackendResult<BufferHandle> {
            let buffer = backend.create_buffer()?;
            created.push(buffer);
            Ok(buffer)
        };

        let positions = create()?;
        backend.upload_vertex_data(positions, self.attribute_data(ShaderInput::Position));

        let normals = if self.has_attribute(ShaderInput::Normal) {
            let buffer = create()?;
            backend.upload_vertex_data(buffer, self.attribute_data(ShaderInput::Normal));
            Some(buffer)
        } else {
            None
        };

        let tex_coords = if self.has_attribute(ShaderInput::TexCoord) {
            let buffer = create()?;
            backend.upload_vertex_data(buffer, self.attribute_data(ShaderInput::TexCoord));
            Some(buffer)
        } else {
            None
        };

        let indices = create()?;
        backend.upload_index_data(indices, &self.triangles);

        Ok(MeshBuffers {
            positions,
            normals,
            tex_coords,
            indices,
        })
    }

    /// Create a unit quad on the XY plane facing +Z
    pub fn quad() -> Self {
        let mut mesh = Mesh::new("quad");
        mesh.vertices = vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ];
        mesh.normals = vec![Vec3::Z; 4];
        mesh.tex_coords = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        mesh.triangles = vec![0, 1, 2, 0, 2, 3];
        mesh
    }

    /// Create a unit cube centered at origin
    pub fn cube() -> Self {
        let mut mesh = Mesh::new("cube");

        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (-Vec3::Z, -Vec3::X, Vec3::Y),
            (Vec3::X, -Vec3::Z, Vec3::Y),
            (-Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, -Vec3::Z),
            (-Vec3::Y, Vec3::X, Vec3::Z),
        ];

        for (normal, right, up) in faces {
            let base = mesh.vertices.len() as u16;
            let center = normal * 0.5;
            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                mesh.vertices
                    .push(center + right * (u - 0.5) + up * (v - 0.5));
                mesh.normals.push(normal);
                mesh.tex_coords.push(Vec2::new(u, v));
            }
            mesh.triangles
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Most segments or rings a sphere can have with 16-bit indices
    pub const MAX_SPHERE_DIVISIONS: u16 = 255;

    /// Create a UV sphere.
    ///
    /// `segments` is clamped to `3..=255` and `rings` to `2..=255`, so the
    /// `(segments + 1) * (rings + 1)` vertices stay addressable by `u16`
    /// indices.
    pub fn sphere(segments: u16, rings: u16) -> Self {
        let mut mesh = Mesh::new("sphere");
        let segments = u32::from(segments.clamp(3, Self::MAX_SPHERE_DIVISIONS));
        let rings = u32::from(rings.clamp(2, Self::MAX_SPHERE_DIVISIONS));

        let segment_angle = 2.0 * std::f32::consts::PI / segments as f32;
        let ring_angle = std::f32::consts::PI / rings as f32;

        for ring in 0..=rings {
            let phi = ring as f32 * ring_angle;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for segment in 0..=segments {
                let theta = segment as f32 * segment_angle;
                let normal = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());

                mesh.vertices.push(normal * 0.5);
                mesh.normals.push(normal.normalize_or_zero());
                mesh.tex_coords.push(Vec2::new(
                    segment as f32 / segments as f32,
                    ring as f32 / rings as f32,
                ));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                // max index is (segments + 1) * (rings + 1) - 1 <= u16::MAX
                mesh.triangles.extend(
                    [current, next, current + 1, current + 1, next, next + 1]
                        .map(|index| index as u16),
                );
            }
        }

        mesh
    }
}
