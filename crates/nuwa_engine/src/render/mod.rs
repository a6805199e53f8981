//! # Rendering System
//!
//! Everything between the scene and the GPU: the backend contract, the
//! camera, materials and uniforms, lighting, pipeline caching, and the
//! [`RenderSystem`] that drives a frame.
//!
//! ## Architecture
//!
//! - **API**: [`GpuBackend`] and [`RenderEncoder`] traits plus opaque handles
//! - **Backends**: an in-memory headless implementation
//! - **Primitives**: camera and vertex record
//! - **Resources**: materials, texture cache, uniform record
//! - **Systems**: lighting
//! - **Render System**: per-frame orchestration

use thiserror::Error;

pub mod api;
pub mod backends;
pub mod pipeline;
pub mod primitives;
pub mod render_system;
pub mod resources;
pub mod systems;

pub use api::{BackendResult, GpuBackend, PrimitiveType, RenderEncoder};
pub use backends::HeadlessBackend;
pub use pipeline::{PipelineManager, ShaderPair};
pub use primitives::{Camera, ProjectionKind, Vertex};
pub use render_system::{FrameOutcome, FrameStats, RenderSystem};
pub use resources::{Material, MaterialManager, Uniforms};
pub use systems::lighting::{Light, LightId, LightType, LightingManager};

/// Rendering and backend errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A GPU object could not be created
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A handle does not refer to a live resource
    #[error("Invalid resource handle: {0}")]
    InvalidHandle(String),

    /// A buffer write does not fit
    #[error("Buffer write of {len} bytes at offset {offset} exceeds capacity {capacity}")]
    BufferOverflow {
        /// Write offset
        offset: usize,
        /// Write length
        len: usize,
        /// Buffer size
        capacity: usize,
    },

    /// A texture could not be read or decoded
    #[error("Texture load failed: {0}")]
    TextureLoad(String),

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// A resource whose absence skipped a draw or a whole frame
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingResource {
    /// No camera assigned to the render system
    #[error("camera")]
    Camera,
    /// No depth texture (zero-sized or never-resized viewport)
    #[error("depth texture")]
    DepthTexture,
    /// Depth/stencil state could not be created
    #[error("depth-stencil state")]
    DepthStencilState,
    /// The backend had no drawable this frame
    #[error("drawable")]
    Drawable,
    /// The backend had no command buffer this frame
    #[error("command buffer")]
    CommandBuffer,
    /// The backend refused to start the render pass
    #[error("render pass encoder")]
    RenderPass,
    /// Entity has no vertex buffer
    #[error("vertex buffer")]
    VertexBuffer,
    /// Entity has no uniform buffer
    #[error("uniform buffer")]
    UniformBuffer,
    /// Entity has no pipeline
    #[error("pipeline")]
    Pipeline,
}
