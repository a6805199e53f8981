//! Pipeline configuration and caching
//!
//! Shader function pairs, the vertex layout handed to pipeline creation, and
//! the [`PipelineManager`] cache that resolves a pair to a backend pipeline.

pub mod pipeline_config;
pub mod pipeline_manager;

pub use pipeline_config::{ShaderPair, VertexAttribute, VertexFormat, VertexLayout};
pub use pipeline_manager::PipelineManager;
