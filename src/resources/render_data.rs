//! Pairing of one mesh with one material

use super::material::Material;
use super::mesh::Mesh;

/// What a material shader draws in one call
#[derive(Debug, Clone)]
pub struct RenderData {
    mesh: Mesh,
    material: Material,
}

impl RenderData {
    pub fn new(mesh: Mesh, material: Material) -> Self {
        Self { mesh, material }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }
}
