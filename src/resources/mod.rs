//! Renderable resources
//!
//! Meshes, materials, and texture references consumed by the material
//! shaders. Creation and upload of texture images happens outside this crate.

mod material;
mod mesh;
mod render_data;
mod texture;

pub use material::*;
pub use mesh::*;
pub use render_data::*;
pub use texture::*;
