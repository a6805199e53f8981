//! GPU-facing resources: materials, textures and per-entity uniforms

pub mod material;
pub mod material_manager;
pub mod uniforms;

pub use material::Material;
pub use material_manager::MaterialManager;
pub use uniforms::{MaterialUniform, Uniforms};
