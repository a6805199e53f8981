//! Pipeline configuration and type definitions
//!
//! Defines the shader pairs the engine knows about and the vertex layout
//! every pipeline is built with.

use std::mem::{offset_of, size_of};

use crate::render::api::shader_types::vertex_attribute;
use crate::render::primitives::Vertex;

/// A vertex/fragment function pair from the shader library
///
/// Used as the pipeline cache key, so each pair is compiled at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderPair {
    /// Unlit vertex color with optional texture (`vertex_main` / `fragment_main`)
    #[default]
    Basic,
    /// Per-pixel Phong lighting (`phongVertexShader` / `phongFragmentShader`)
    Phong,
}

impl ShaderPair {
    /// Vertex function name
    pub const fn vertex_function(self) -> &'static str {
        match self {
            Self::Basic => "vertex_main",
            Self::Phong => "phongVertexShader",
        }
    }

    /// Fragment function name
    pub const fn fragment_function(self) -> &'static str {
        match self {
            Self::Basic => "fragment_main",
            Self::Phong => "phongFragmentShader",
        }
    }

    /// Label used for pipeline objects and logs
    pub fn label(self) -> String {
        format!("{}-{}", self.vertex_function(), self.fragment_function())
    }
}

/// Format of a single vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Two 32-bit floats
    Float2,
    /// Three 32-bit floats
    Float3,
    /// Four 32-bit floats
    Float4,
    /// One 32-bit unsigned integer
    UInt,
}

impl VertexFormat {
    /// Size in bytes
    pub const fn size(self) -> usize {
        match self {
            Self::Float2 => 8,
            Self::Float3 => 12,
            Self::Float4 => 16,
            Self::UInt => 4,
        }
    }
}

/// One attribute within an interleaved vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub location: u32,
    /// Data format
    pub format: VertexFormat,
    /// Byte offset within the vertex
    pub offset: usize,
}

/// Interleaved vertex buffer layout
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Distance in bytes between consecutive vertices
    pub stride: usize,
    /// Attributes in location order
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout of [`Vertex`]
    pub fn standard() -> Self {
        let attribute = |location, format, offset| VertexAttribute {
            location,
            format,
            offset,
        };

        Self {
            stride: size_of::<Vertex>(),
            attributes: vec![
                attribute(vertex_attribute::POSITION, VertexFormat::Float4, offset_of!(Vertex, position)),
                attribute(vertex_attribute::COLOR, VertexFormat::Float4, offset_of!(Vertex, color)),
                attribute(vertex_attribute::NORMAL, VertexFormat::Float3, offset_of!(Vertex, normal)),
                attribute(vertex_attribute::TEXCOORD, VertexFormat::Float2, offset_of!(Vertex, tex_coord)),
                attribute(vertex_attribute::TANGENT, VertexFormat::Float3, offset_of!(Vertex, tangent)),
                attribute(vertex_attribute::BITANGENT, VertexFormat::Float3, offset_of!(Vertex, bitangent)),
                attribute(vertex_attribute::INSTANCE_ID, VertexFormat::UInt, offset_of!(Vertex, instance_id)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_layout_covers_vertex_without_gaps() {
        let layout = VertexLayout::standard();
        assert_eq!(layout.stride, 80);

        let mut expected_offset = 0;
        for attribute in &layout.attributes {
            assert_eq!(attribute.offset, expected_offset, "gap before location {}", attribute.location);
            expected_offset += attribute.format.size();
        }
        assert_eq!(expected_offset, layout.stride);
    }

    #[test]
    fn shader_pairs_name_library_functions() {
        assert_eq!(ShaderPair::Basic.label(), "vertex_main-fragment_main");
        assert_eq!(ShaderPair::Phong.vertex_function(), "phongVertexShader");
        assert_eq!(ShaderPair::default(), ShaderPair::Basic);
    }
}
