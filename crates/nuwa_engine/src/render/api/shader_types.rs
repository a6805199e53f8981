//! Binding slots and attribute locations shared with the shader library.
//!
//! These values are part of the wire contract: changing one requires the
//! matching change on the shader side.

/// Buffer argument slots
pub mod buffer_index {
    /// Per-vertex data
    pub const MESH_POSITIONS: u32 = 0;
    /// Per-entity `Uniforms` record (vertex and fragment stages)
    pub const UNIFORMS: u32 = 2;
    /// Array of `LightRecord`s
    pub const LIGHTS: u32 = 3;
    /// Number of valid records in the light buffer, as an `i32`
    pub const LIGHT_COUNT: u32 = 4;
}

/// Vertex attribute locations
pub mod vertex_attribute {
    /// Homogeneous position
    pub const POSITION: u32 = 0;
    /// RGBA color
    pub const COLOR: u32 = 1;
    /// Surface normal
    pub const NORMAL: u32 = 2;
    /// UV coordinates
    pub const TEXCOORD: u32 = 3;
    /// Tangent for normal mapping
    pub const TANGENT: u32 = 4;
    /// Bitangent for normal mapping
    pub const BITANGENT: u32 = 5;
    /// Instance identifier
    pub const INSTANCE_ID: u32 = 6;
}

/// Texture argument slots
pub mod texture_index {
    /// Base color texture
    pub const COLOR: u32 = 0;
}
