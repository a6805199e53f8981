//! In-memory GPU backend
//!
//! Buffers are plain byte vectors, textures are descriptors plus optional
//! pixel data, and pipelines or depth states are just remembered
//! descriptors. Encoders append [`RecordedCommand`]s to a shared log that
//! callers can inspect.
//!
//! Failure switches (`fail_*`) let callers simulate a backend that runs out
//! of drawables, command buffers or allocation space.

use std::collections::HashMap;

use crate::render::api::{
    BackendResult, BufferHandle, CommandBufferHandle, DepthStencilDescriptor, DepthStencilHandle,
    DrawableHandle, GpuBackend, PipelineDescriptor, PipelineHandle, PrimitiveType, RenderEncoder,
    RenderPassDescriptor, ShaderStages, TextureDescriptor, TextureHandle,
};
use crate::render::RenderError;

/// One command observed by the headless backend
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// A render pass was started
    BeginPass {
        /// Command buffer the pass belongs to
        command_buffer: CommandBufferHandle,
        /// Clear color requested for the drawable
        clear_color: [f64; 4],
        /// Depth attachment
        depth_texture: TextureHandle,
    },
    /// Depth/stencil state bound
    SetDepthStencilState(DepthStencilHandle),
    /// Pipeline bound
    SetPipeline(PipelineHandle),
    /// Buffer bound to an argument slot
    SetBuffer {
        /// Visible stages
        stages: ShaderStages,
        /// Argument slot
        index: u32,
        /// Bound buffer
        buffer: BufferHandle,
    },
    /// Inline bytes copied to an argument slot
    SetBytes {
        /// Visible stages
        stages: ShaderStages,
        /// Argument slot
        index: u32,
        /// Copied bytes
        bytes: Vec<u8>,
    },
    /// Texture bound to a texture slot
    SetTexture {
        /// Visible stages
        stages: ShaderStages,
        /// Texture slot
        index: u32,
        /// Bound texture
        texture: TextureHandle,
    },
    /// Non-indexed draw
    Draw {
        /// Topology
        primitive: PrimitiveType,
        /// First vertex
        vertex_start: u32,
        /// Vertex count
        vertex_count: u32,
    },
    /// Render pass finished
    EndEncoding,
    /// Drawable scheduled for presentation
    Present(DrawableHandle),
    /// Drawable handed back unpresented
    DiscardDrawable(DrawableHandle),
    /// Command buffer submitted
    Commit(CommandBufferHandle),
}

struct TextureEntry {
    descriptor: TextureDescriptor,
    pixels: Option<Vec<u8>>,
}

/// GPU backend that keeps all state in memory
#[derive(Default)]
pub struct HeadlessBackend {
    next_id: u64,
    buffers: HashMap<BufferHandle, Vec<u8>>,
    buffer_labels: HashMap<BufferHandle, String>,
    textures: HashMap<TextureHandle, TextureEntry>,
    pipelines: HashMap<PipelineHandle, PipelineDescriptor>,
    depth_states: HashMap<DepthStencilHandle, DepthStencilDescriptor>,
    commands: Vec<RecordedCommand>,
    committed_frames: u64,

    /// Make `create_buffer` fail
    pub fail_buffer_creation: bool,
    /// Make `create_pipeline` fail
    pub fail_pipeline_creation: bool,
    /// Make `next_drawable` return `None`
    pub fail_drawable: bool,
    /// Make `make_command_buffer` return `None`
    pub fail_command_buffer: bool,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Commands recorded since creation or the last [`clear_commands`](Self::clear_commands)
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Forget recorded commands
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Recorded draw calls as `(primitive, vertex_start, vertex_count)`
    pub fn draw_calls(&self) -> Vec<(PrimitiveType, u32, u32)> {
        self.commands
            .iter()
            .filter_map(|command| match *command {
                RecordedCommand::Draw {
                    primitive,
                    vertex_start,
                    vertex_count,
                } => Some((primitive, vertex_start, vertex_count)),
                _ => None,
            })
            .collect()
    }

    /// Current contents of a live buffer
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(Vec::as_slice)
    }

    /// Label a live buffer was created with
    pub fn buffer_label(&self, buffer: BufferHandle) -> Option<&str> {
        self.buffer_labels.get(&buffer).map(String::as_str)
    }

    /// Descriptor of a live texture
    pub fn texture_descriptor(&self, texture: TextureHandle) -> Option<&TextureDescriptor> {
        self.textures.get(&texture).map(|entry| &entry.descriptor)
    }

    /// Base-level pixels of a live texture, if any were uploaded
    pub fn texture_pixels(&self, texture: TextureHandle) -> Option<&[u8]> {
        self.textures.get(&texture).and_then(|entry| entry.pixels.as_deref())
    }

    /// Descriptor of a created pipeline
    pub fn pipeline_descriptor(&self, pipeline: PipelineHandle) -> Option<&PipelineDescriptor> {
        self.pipelines.get(&pipeline)
    }

    /// Descriptor of a created depth/stencil state
    pub fn depth_stencil_descriptor(&self, state: DepthStencilHandle) -> Option<&DepthStencilDescriptor> {
        self.depth_states.get(&state)
    }

    /// Number of live buffers
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live textures
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of pipelines ever created
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Number of command buffers committed
    pub const fn committed_frames(&self) -> u64 {
        self.committed_frames
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_buffer(&mut self, label: &str, contents: &[u8]) -> BackendResult<BufferHandle> {
        if self.fail_buffer_creation {
            return Err(RenderError::ResourceCreationFailed(format!(
                "buffer '{label}' ({} bytes)",
                contents.len()
            )));
        }
        let handle = BufferHandle(self.allocate_id());
        self.buffers.insert(handle, contents.to_vec());
        self.buffer_labels.insert(handle, label.to_string());
        log::trace!("headless: created buffer {label} {handle:?} ({} bytes)", contents.len());
        Ok(handle)
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> BackendResult<()> {
        let storage = self
            .buffers
            .get_mut(&buffer)
            .ok_or_else(|| RenderError::InvalidHandle(format!("{buffer:?}")))?;
        let end = offset + data.len();
        if end > storage.len() {
            return Err(RenderError::BufferOverflow {
                offset,
                len: data.len(),
                capacity: storage.len(),
            });
        }
        storage[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn release_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.buffer_labels.remove(&buffer);
    }

    fn create_texture(
        &mut self,
        descriptor: &TextureDescriptor,
        pixels: Option<&[u8]>,
    ) -> BackendResult<TextureHandle> {
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture '{}' has zero size",
                descriptor.label
            )));
        }
        if let Some(pixels) = pixels {
            if pixels.len() != descriptor.byte_len() {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "texture '{}' expects {} bytes, got {}",
                    descriptor.label,
                    descriptor.byte_len(),
                    pixels.len()
                )));
            }
        }
        let handle = TextureHandle(self.allocate_id());
        self.textures.insert(
            handle,
            TextureEntry {
                descriptor: descriptor.clone(),
                pixels: pixels.map(<[u8]>::to_vec),
            },
        );
        Ok(handle)
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn create_pipeline(&mut self, descriptor: &PipelineDescriptor) -> BackendResult<PipelineHandle> {
        if self.fail_pipeline_creation {
            return Err(RenderError::ResourceCreationFailed(format!(
                "pipeline '{}'",
                descriptor.label
            )));
        }
        let handle = PipelineHandle(self.allocate_id());
        self.pipelines.insert(handle, descriptor.clone());
        Ok(handle)
    }

    fn create_depth_stencil_state(
        &mut self,
        descriptor: &DepthStencilDescriptor,
    ) -> BackendResult<DepthStencilHandle> {
        let handle = DepthStencilHandle(self.allocate_id());
        self.depth_states.insert(handle, *descriptor);
        Ok(handle)
    }

    fn next_drawable(&mut self) -> Option<DrawableHandle> {
        if self.fail_drawable {
            return None;
        }
        Some(DrawableHandle(self.allocate_id()))
    }

    fn make_command_buffer(&mut self) -> Option<CommandBufferHandle> {
        if self.fail_command_buffer {
            return None;
        }
        Some(CommandBufferHandle(self.allocate_id()))
    }

    fn begin_render_pass<'a>(
        &'a mut self,
        command_buffer: CommandBufferHandle,
        _drawable: DrawableHandle,
        pass: &RenderPassDescriptor,
    ) -> Option<Box<dyn RenderEncoder + 'a>> {
        if !self.textures.contains_key(&pass.depth_texture) {
            log::warn!("headless: depth attachment {:?} is not a live texture", pass.depth_texture);
            return None;
        }
        self.commands.push(RecordedCommand::BeginPass {
            command_buffer,
            clear_color: pass.clear_color,
            depth_texture: pass.depth_texture,
        });
        Some(Box::new(HeadlessEncoder {
            commands: &mut self.commands,
        }))
    }

    fn discard_drawable(&mut self, drawable: DrawableHandle) {
        self.commands.push(RecordedCommand::DiscardDrawable(drawable));
    }

    fn present(&mut self, _command_buffer: CommandBufferHandle, drawable: DrawableHandle) {
        self.commands.push(RecordedCommand::Present(drawable));
    }

    fn commit(&mut self, command_buffer: CommandBufferHandle) {
        self.commands.push(RecordedCommand::Commit(command_buffer));
        self.committed_frames += 1;
    }
}

struct HeadlessEncoder<'a> {
    commands: &'a mut Vec<RecordedCommand>,
}

impl RenderEncoder for HeadlessEncoder<'_> {
    fn set_depth_stencil_state(&mut self, state: DepthStencilHandle) {
        self.commands.push(RecordedCommand::SetDepthStencilState(state));
    }

    fn set_pipeline(&mut self, pipeline: PipelineHandle) {
        self.commands.push(RecordedCommand::SetPipeline(pipeline));
    }

    fn set_buffer(&mut self, stages: ShaderStages, index: u32, buffer: BufferHandle, _offset: usize) {
        self.commands.push(RecordedCommand::SetBuffer {
            stages,
            index,
            buffer,
        });
    }

    fn set_bytes(&mut self, stages: ShaderStages, index: u32, bytes: &[u8]) {
        self.commands.push(RecordedCommand::SetBytes {
            stages,
            index,
            bytes: bytes.to_vec(),
        });
    }

    fn set_texture(&mut self, stages: ShaderStages, index: u32, texture: TextureHandle) {
        self.commands.push(RecordedCommand::SetTexture {
            stages,
            index,
            texture,
        });
    }

    fn draw(&mut self, primitive: PrimitiveType, vertex_start: u32, vertex_count: u32) {
        self.commands.push(RecordedCommand::Draw {
            primitive,
            vertex_start,
            vertex_count,
        });
    }

    fn end_encoding(self: Box<Self>) {
        self.commands.push(RecordedCommand::EndEncoding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_writes_are_bounds_checked() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer("test", &[0u8; 8]).unwrap();

        backend.write_buffer(buffer, 4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(backend.buffer_contents(buffer), Some(&[0, 0, 0, 0, 1, 2, 3, 4][..]));

        let overflow = backend.write_buffer(buffer, 6, &[9, 9, 9]);
        assert!(matches!(overflow, Err(RenderError::BufferOverflow { capacity: 8, .. })));
    }

    #[test]
    fn released_buffers_reject_writes() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer("test", &[0u8; 4]).unwrap();
        backend.release_buffer(buffer);

        assert_eq!(backend.live_buffer_count(), 0);
        assert!(matches!(
            backend.write_buffer(buffer, 0, &[1]),
            Err(RenderError::InvalidHandle(_))
        ));
    }

    #[test]
    fn render_pass_requires_live_depth_texture() {
        let mut backend = HeadlessBackend::new();
        let depth = backend
            .create_texture(&TextureDescriptor::depth_target(4, 4), None)
            .unwrap();
        let command_buffer = backend.make_command_buffer().unwrap();
        let drawable = backend.next_drawable().unwrap();
        let pass = RenderPassDescriptor {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_texture: depth,
            clear_depth: 1.0,
        };

        let encoder = backend.begin_render_pass(command_buffer, drawable, &pass).unwrap();
        encoder.end_encoding();

        backend.release_texture(depth);
        assert!(backend.begin_render_pass(command_buffer, drawable, &pass).is_none());
        assert_eq!(
            backend.commands().last(),
            Some(&RecordedCommand::EndEncoding)
        );
    }

    #[test]
    fn texture_pixels_must_match_descriptor() {
        let mut backend = HeadlessBackend::new();
        let mut descriptor = TextureDescriptor::depth_target(2, 2);
        descriptor.label = "color".to_string();

        assert!(backend.create_texture(&descriptor, Some(&[0u8; 15])).is_err());
        let texture = backend.create_texture(&descriptor, Some(&[7u8; 16])).unwrap();
        assert_eq!(backend.texture_pixels(texture).map(<[u8]>::len), Some(16));
    }

    #[test]
    fn failure_switches_suppress_frame_resources() {
        let mut backend = HeadlessBackend::new();
        backend.fail_drawable = true;
        backend.fail_command_buffer = true;
        assert!(backend.next_drawable().is_none());
        assert!(backend.make_command_buffer().is_none());
    }
}
