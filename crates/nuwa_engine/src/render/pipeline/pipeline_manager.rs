//! Pipeline manager for handling multiple render pipelines
//!
//! Caches one backend pipeline per [`ShaderPair`]. Entities resolve their
//! pipeline once at construction through [`PipelineManager::get_or_create`];
//! a pair that fails to compile is retried on the next request.

use std::collections::HashMap;

use super::pipeline_config::{ShaderPair, VertexLayout};
use crate::render::api::{GpuBackend, PipelineDescriptor, PipelineHandle, PixelFormat};

/// Manages the pipelines created for each shader pair
#[derive(Debug)]
pub struct PipelineManager {
    pipelines: HashMap<ShaderPair, PipelineHandle>,
    color_format: PixelFormat,
    depth_format: PixelFormat,
}

impl Default for PipelineManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineManager {
    /// Create a manager targeting a BGRA8 drawable with a 32-bit float depth buffer
    pub fn new() -> Self {
        Self::with_formats(PixelFormat::Bgra8Unorm, PixelFormat::Depth32Float)
    }

    /// Create a manager for custom attachment formats
    pub fn with_formats(color_format: PixelFormat, depth_format: PixelFormat) -> Self {
        Self {
            pipelines: HashMap::new(),
            color_format,
            depth_format,
        }
    }

    /// Return the cached pipeline for `pair`, compiling it on first use
    ///
    /// Returns `None` (after logging) when the backend cannot build it.
    pub fn get_or_create(&mut self, pair: ShaderPair, backend: &mut dyn GpuBackend) -> Option<PipelineHandle> {
        if let Some(&pipeline) = self.pipelines.get(&pair) {
            return Some(pipeline);
        }

        log::debug!("Creating {pair:?} pipeline");
        let descriptor = PipelineDescriptor {
            label: pair.label(),
            vertex_function: pair.vertex_function(),
            fragment_function: pair.fragment_function(),
            vertex_layout: VertexLayout::standard(),
            color_format: self.color_format,
            depth_format: self.depth_format,
        };

        match backend.create_pipeline(&descriptor) {
            Ok(pipeline) => {
                self.pipelines.insert(pair, pipeline);
                Some(pipeline)
            }
            Err(e) => {
                log::error!("Failed to create {pair:?} pipeline: {e}");
                None
            }
        }
    }

    /// The lit fallback pipeline
    pub fn default_pipeline(&mut self, backend: &mut dyn GpuBackend) -> Option<PipelineHandle> {
        self.get_or_create(ShaderPair::Phong, backend)
    }

    /// Cached pipeline for `pair`, without creating it
    pub fn get_pipeline(&self, pair: ShaderPair) -> Option<PipelineHandle> {
        self.pipelines.get(&pair).copied()
    }

    /// Number of cached pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether nothing has been compiled yet
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::HeadlessBackend;

    #[test]
    fn each_pair_is_compiled_once() {
        let mut backend = HeadlessBackend::new();
        let mut manager = PipelineManager::new();

        let first = manager.get_or_create(ShaderPair::Basic, &mut backend).unwrap();
        let second = manager.get_or_create(ShaderPair::Basic, &mut backend).unwrap();
        let phong = manager.default_pipeline(&mut backend).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, phong);
        assert_eq!(backend.pipeline_count(), 2);
        assert_eq!(manager.len(), 2);

        let descriptor = backend.pipeline_descriptor(first).unwrap();
        assert_eq!(descriptor.vertex_function, "vertex_main");
        assert_eq!(descriptor.color_format, PixelFormat::Bgra8Unorm);
        assert_eq!(descriptor.depth_format, PixelFormat::Depth32Float);
    }

    #[test]
    fn failed_compilation_is_not_cached() {
        let mut backend = HeadlessBackend::new();
        let mut manager = PipelineManager::new();

        backend.fail_pipeline_creation = true;
        assert!(manager.get_or_create(ShaderPair::Phong, &mut backend).is_none());
        assert!(manager.is_empty());

        backend.fail_pipeline_creation = false;
        assert!(manager.get_or_create(ShaderPair::Phong, &mut backend).is_some());
        assert_eq!(manager.get_pipeline(ShaderPair::Phong), manager.get_pipeline(ShaderPair::Phong));
    }
}
