//! Per-entity uniform record
//!
//! Written once per frame per entity and bound at
//! [`buffer_index::UNIFORMS`](crate::render::api::shader_types::buffer_index::UNIFORMS)
//! for both shader stages.

use bytemuck::{Pod, Zeroable};

use super::Material;
use crate::foundation::math::{Mat4, Vec3};

/// Material block of the uniform record
///
/// Four 16-byte rows; each color shares a row with one scalar.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Base color
    pub diffuse_color: [f32; 3],
    /// Phong exponent
    pub shininess: f32,
    /// Specular color
    pub specular_color: [f32; 3],
    /// Roughness
    pub roughness: f32,
    /// Emissive color
    pub emissive_color: [f32; 3],
    /// Metallic factor
    pub metallic: f32,
    /// Reflectivity
    pub reflectivity: f32,
    /// 1 when a color texture is bound
    pub has_texture: i32,
    /// Alignment padding
    pub _padding: [f32; 2],
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            diffuse_color: material.diffuse_color.into(),
            shininess: material.shininess,
            specular_color: material.specular_color.into(),
            roughness: material.roughness,
            emissive_color: material.emissive_color.into(),
            metallic: material.metallic,
            reflectivity: material.reflectivity,
            has_texture: i32::from(material.has_texture()),
            _padding: [0.0; 2],
        }
    }
}

/// Uniform record: matrices are column-major
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    /// Local-to-world transform
    pub model: [[f32; 4]; 4],
    /// World-to-clip transform
    pub view_projection: [[f32; 4]; 4],
    /// Eye position in world space
    pub camera_position: [f32; 3],
    /// Alignment padding
    pub _padding: f32,
    /// Material snapshot
    pub material: MaterialUniform,
}

impl Uniforms {
    /// Assemble the record for one entity
    pub fn new(model: &Mat4, view_projection: &Mat4, camera_position: &Vec3, material: &Material) -> Self {
        Self {
            model: (*model).into(),
            view_projection: (*view_projection).into(),
            camera_position: (*camera_position).into(),
            _padding: 0.0,
            material: MaterialUniform::from(material),
        }
    }

    /// Size in bytes of the record
    pub const SIZE: usize = std::mem::size_of::<Self>();
}
