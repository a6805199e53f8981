//! Backend abstraction traits for the rendering system
//!
//! The engine never talks to a graphics API directly. Everything that
//! allocates GPU memory or records commands goes through [`GpuBackend`] and
//! the [`RenderEncoder`] it hands out for a render pass. Resources are
//! referred to by small copyable handles; the backend owns the real objects.

use bitflags::bitflags;

use crate::render::pipeline::VertexLayout;
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a compiled render pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub u64);

/// Handle to a depth/stencil state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilHandle(pub u64);

/// Handle to the presentable surface acquired for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableHandle(pub u64);

/// Handle to a command buffer acquired for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBufferHandle(pub u64);

bitflags! {
    /// Shader stages a binding is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u32 {
        /// Vertex stage
        const VERTEX = 1 << 0;
        /// Fragment stage
        const FRAGMENT = 1 << 1;
    }
}

/// Primitive topology for a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Independent points
    Point,
    /// Each pair of vertices is a line segment
    Line,
    /// Connected line segments
    LineStrip,
    /// Each triple of vertices is a triangle
    Triangle,
    /// Connected triangles sharing edges
    TriangleStrip,
}

/// Pixel formats used by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit BGRA, the drawable format
    Bgra8Unorm,
    /// 8-bit RGBA, used for decoded textures
    Rgba8Unorm,
    /// 32-bit float depth
    Depth32Float,
}

impl PixelFormat {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8Unorm | Self::Rgba8Unorm | Self::Depth32Float => 4,
        }
    }
}

/// How a texture will be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureUsage {
    /// Sampled from shaders
    ShaderRead,
    /// Written as a render attachment (color or depth)
    RenderTarget,
}

/// Parameters for texture creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    /// Debug label
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Intended usage
    pub usage: TextureUsage,
    /// Whether a full mip chain should be generated
    pub mipmapped: bool,
}

impl TextureDescriptor {
    /// Descriptor for a depth attachment covering the drawable
    pub fn depth_target(width: u32, height: u32) -> Self {
        Self {
            label: "depth".to_string(),
            width,
            height,
            format: PixelFormat::Depth32Float,
            usage: TextureUsage::RenderTarget,
            mipmapped: false,
        }
    }

    /// Size in bytes of the base level
    pub const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Parameters for pipeline creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescriptor {
    /// Debug label
    pub label: String,
    /// Vertex function name in the shader library
    pub vertex_function: &'static str,
    /// Fragment function name in the shader library
    pub fragment_function: &'static str,
    /// Vertex buffer layout
    pub vertex_layout: VertexLayout,
    /// Color attachment format
    pub color_format: PixelFormat,
    /// Depth attachment format
    pub depth_format: PixelFormat,
}

/// Depth comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    /// Never passes
    Never,
    /// Passes when the incoming depth is smaller
    Less,
    /// Passes when the incoming depth is smaller or equal
    LessEqual,
    /// Always passes
    Always,
}

/// Parameters for depth/stencil state creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilDescriptor {
    /// Comparison applied to incoming fragments
    pub compare: CompareFunction,
    /// Whether passing fragments write depth
    pub depth_write_enabled: bool,
}

impl Default for DepthStencilDescriptor {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Less,
            depth_write_enabled: true,
        }
    }
}

/// Attachments and clear values for a render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPassDescriptor {
    /// Color the drawable is cleared to
    pub clear_color: [f64; 4],
    /// Depth attachment
    pub depth_texture: TextureHandle,
    /// Depth clear value
    pub clear_depth: f64,
}

/// Command recording for one render pass
///
/// Obtained from [`GpuBackend::begin_render_pass`] and consumed by
/// [`RenderEncoder::end_encoding`].
pub trait RenderEncoder {
    /// Bind a depth/stencil state
    fn set_depth_stencil_state(&mut self, state: DepthStencilHandle);

    /// Bind a render pipeline
    fn set_pipeline(&mut self, pipeline: PipelineHandle);

    /// Bind a buffer at `index` for the given stages
    fn set_buffer(&mut self, stages: ShaderStages, index: u32, buffer: BufferHandle, offset: usize);

    /// Copy a small block of bytes into argument slot `index`
    fn set_bytes(&mut self, stages: ShaderStages, index: u32, bytes: &[u8]);

    /// Bind a texture at `index` for the given stages
    fn set_texture(&mut self, stages: ShaderStages, index: u32, texture: TextureHandle);

    /// Issue a non-indexed draw
    fn draw(&mut self, primitive: PrimitiveType, vertex_start: u32, vertex_count: u32);

    /// Finish the pass
    fn end_encoding(self: Box<Self>);
}

/// GPU resource allocation and frame submission
pub trait GpuBackend {
    /// Create a buffer initialized with `contents`
    fn create_buffer(&mut self, label: &str, contents: &[u8]) -> BackendResult<BufferHandle>;

    /// Overwrite part of a buffer
    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> BackendResult<()>;

    /// Free a buffer. Unknown handles are ignored.
    fn release_buffer(&mut self, buffer: BufferHandle);

    /// Create a texture, optionally uploading base-level pixels
    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> BackendResult<TextureHandle>;

    /// Free a texture. Unknown handles are ignored.
    fn release_texture(&mut self, texture: TextureHandle);

    /// Compile a render pipeline
    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor) -> BackendResult<PipelineHandle>;

    /// Create a depth/stencil state object
    fn create_depth_stencil_state(
        &mut self,
        descriptor: &DepthStencilDescriptor,
    ) -> BackendResult<DepthStencilHandle>;

    /// Acquire the surface to draw into this frame
    fn next_drawable(&mut self) -> Option<DrawableHandle>;

    /// Acquire a command buffer for this frame
    fn make_command_buffer(&mut self) -> Option<CommandBufferHandle>;

    /// Begin a render pass targeting `drawable`
    fn begin_render_pass<'a>(
        &'a mut self,
        command_buffer: CommandBufferHandle,
        drawable: DrawableHandle,
        pass: &RenderPassDescriptor,
    ) -> Option<Box<dyn RenderEncoder + 'a>>;

    /// Give back a drawable that will not be presented this frame
    fn discard_drawable(&mut self, drawable: DrawableHandle) {
        let _ = drawable;
    }

    /// Schedule `drawable` for presentation once `command_buffer` completes
    fn present(&mut self, command_buffer: CommandBufferHandle, drawable: DrawableHandle);

    /// Submit the command buffer
    fn commit(&mut self, command_buffer: CommandBufferHandle);
}
