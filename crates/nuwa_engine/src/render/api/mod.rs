//! # Rendering API
//!
//! The contract between the engine core and a GPU backend, plus the binding
//! slots shared with the shaders.

pub mod gpu_backend;
pub mod shader_types;

pub use gpu_backend::{
    BackendResult, BufferHandle, CommandBufferHandle, CompareFunction, DepthStencilDescriptor,
    DepthStencilHandle, DrawableHandle, GpuBackend, PipelineDescriptor, PipelineHandle,
    PixelFormat, PrimitiveType, RenderEncoder, RenderPassDescriptor, ShaderStages,
    TextureDescriptor, TextureHandle, TextureUsage,
};
