//! Vertex record shared with the shader library

use bytemuck::{Pod, Zeroable};

/// Per-vertex data
///
/// Tightly packed `f32` fields followed by a `u32` instance id; 80 bytes
/// with no implicit padding. [`VertexLayout::standard`] describes the same
/// layout to the pipeline.
///
/// [`VertexLayout::standard`]: crate::render::pipeline::VertexLayout::standard
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Homogeneous position (`w == 1`)
    pub position: [f32; 4],

    /// RGBA color
    pub color: [f32; 4],

    /// Surface normal
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],

    /// Tangent vector for normal mapping
    pub tangent: [f32; 3],

    /// Bitangent vector for normal mapping
    pub bitangent: [f32; 3],

    /// Instance identifier
    pub instance_id: u32,
}

impl Vertex {
    /// Create a vertex with a default tangent frame
    pub const fn new(position: [f32; 3], color: [f32; 4], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position: [position[0], position[1], position[2], 1.0],
            color,
            normal,
            tex_coord,
            tangent: [1.0, 0.0, 0.0],
            bitangent: [0.0, 1.0, 0.0],
            instance_id: 0,
        }
    }

    /// Replace the tangent frame
    #[must_use]
    pub const fn with_tangent_frame(mut self, tangent: [f32; 3], bitangent: [f32; 3]) -> Self {
        self.tangent = tangent;
        self.bitangent = bitangent;
        self
    }

    /// Position without the homogeneous component
    pub const fn xyz(&self) -> [f32; 3] {
        [self.position[0], self.position[1], self.position[2]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 80);
        assert_eq!(std::mem::align_of::<Vertex>(), 4);
    }

    #[test]
    fn new_sets_homogeneous_w() {
        let v = Vertex::new([1.0, 2.0, 3.0], [1.0; 4], [0.0, 0.0, 1.0], [0.5, 0.5]);
        assert_eq!(v.position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(v.xyz(), [1.0, 2.0, 3.0]);
    }
}
