//! # Render System
//!
//! Per-frame orchestration. A frame runs in a fixed order:
//!
//! 1. scene update (animators and behaviors, entity list order)
//! 2. uniform refresh with `projection * view` and the camera position
//! 3. light buffer refresh when the lights changed
//! 4. command encoding: depth state, lights, then one draw per entity
//! 5. submit: end encoding, present, commit
//!
//! Anything the frame cannot do without (camera, depth texture, depth
//! state, drawable, command buffer, encoder) skips the whole frame with a
//! warning. Nothing is drawn and the next frame starts clean. A single
//! entity missing a resource only skips that entity.

use crate::core::EngineConfig;
use crate::render::api::shader_types::buffer_index;
use crate::render::api::{
    DepthStencilDescriptor, DepthStencilHandle, DrawableHandle, GpuBackend, RenderPassDescriptor,
    ShaderStages, TextureDescriptor, TextureHandle,
};
use crate::render::pipeline::PipelineManager;
use crate::render::primitives::Camera;
use crate::render::resources::MaterialManager;
use crate::render::MissingResource;
use crate::scene::Scene;

/// Counters for a presented frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Zero-based index among presented frames
    pub frame_index: u64,
    /// Entities that issued a draw call
    pub entities_drawn: usize,
    /// Entities skipped for a missing resource
    pub entities_skipped: usize,
    /// Light records bound for the shaders
    pub lights_bound: usize,
}

/// What happened to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Encoded, presented and committed
    Presented(FrameStats),
    /// Dropped before anything was drawn
    Skipped(MissingResource),
}

impl FrameOutcome {
    /// Stats of a presented frame
    pub const fn stats(&self) -> Option<&FrameStats> {
        match self {
            Self::Presented(stats) => Some(stats),
            Self::Skipped(_) => None,
        }
    }

    /// Whether the frame reached the screen
    pub const fn is_presented(&self) -> bool {
        matches!(self, Self::Presented(_))
    }
}

/// Owns the camera, depth resources and GPU object caches
#[derive(Debug)]
pub struct RenderSystem {
    camera: Option<Camera>,
    depth_texture: Option<TextureHandle>,
    depth_state: Option<DepthStencilHandle>,
    viewport: (u32, u32),
    clear_color: [f64; 4],
    pipelines: PipelineManager,
    materials: MaterialManager,
    frame_count: u64,
}

impl RenderSystem {
    /// Create the depth state, the camera and a depth texture sized to the configured viewport
    pub fn new(config: &EngineConfig, backend: &mut dyn GpuBackend) -> Self {
        log::info!(
            "Initializing render system ({}x{})",
            config.viewport.width,
            config.viewport.height
        );

        let depth_state = backend
            .create_depth_stencil_state(&DepthStencilDescriptor::default())
            .map_err(|e| log::error!("Failed to create depth-stencil state: {e}"))
            .ok();

        let mut system = Self {
            camera: Some(config.camera.build_camera(&config.viewport)),
            depth_texture: None,
            depth_state,
            viewport: (0, 0),
            clear_color: config.clear_color,
            pipelines: PipelineManager::new(),
            materials: MaterialManager::new(&config.assets.texture_root),
            frame_count: 0,
        };
        system.resize(config.viewport.width, config.viewport.height, backend);
        system
    }

    /// Run one whole frame: update, then render
    pub fn frame(&mut self, scene: &mut Scene, delta_time: f32, backend: &mut dyn GpuBackend) -> FrameOutcome {
        self.update(scene, delta_time);
        self.render(scene, backend)
    }

    /// Advance the scene's animators and behaviors
    pub fn update(&mut self, scene: &mut Scene, delta_time: f32) {
        log::trace!("Updating scene ({} entities, dt {delta_time:.4})", scene.entity_count());
        scene.update(delta_time);
    }

    /// Refresh uniforms and lights, then encode and submit one frame
    pub fn render(&mut self, scene: &mut Scene, backend: &mut dyn GpuBackend) -> FrameOutcome {
        let Some(camera) = self.camera.as_ref() else {
            return Self::skip(MissingResource::Camera);
        };

        let view_projection = camera.get_projection_matrix() * camera.get_view_matrix();
        scene.update_uniforms(&view_projection, &camera.position, backend);

        if let Some(lighting) = scene.lighting_mut() {
            lighting.refresh(backend);
        }
        let (light_buffer, light_count) = scene
            .lighting()
            .map_or((None, 0), |lighting| (lighting.buffer(), lighting.uploaded_count()));

        let Some(depth_texture) = self.depth_texture else {
            return Self::skip(MissingResource::DepthTexture);
        };
        let Some(depth_state) = self.depth_state else {
            return Self::skip(MissingResource::DepthStencilState);
        };
        let Some(drawable) = backend.next_drawable() else {
            return Self::skip(MissingResource::Drawable);
        };
        let Some(command_buffer) = backend.make_command_buffer() else {
            return Self::skip_with_drawable(MissingResource::CommandBuffer, drawable, backend);
        };

        let pass = RenderPassDescriptor {
            clear_color: self.clear_color,
            depth_texture,
            clear_depth: 1.0,
        };
        // The encoder borrows the backend until the pass ends
        let encoded = match backend.begin_render_pass(command_buffer, drawable, &pass) {
            Some(mut encoder) => {
                encoder.set_depth_stencil_state(depth_state);
                if let Some(buffer) = light_buffer {
                    encoder.set_buffer(ShaderStages::FRAGMENT, buffer_index::LIGHTS, buffer, 0);
                }
                let count = i32::try_from(light_count).unwrap_or(i32::MAX);
                encoder.set_bytes(ShaderStages::FRAGMENT, buffer_index::LIGHT_COUNT, &count.to_ne_bytes());

                let summary = scene.draw(encoder.as_mut());
                encoder.end_encoding();
                Some(summary)
            }
            None => None,
        };
        let Some(summary) = encoded else {
            return Self::skip_with_drawable(MissingResource::RenderPass, drawable, backend);
        };

        backend.present(command_buffer, drawable);
        backend.commit(command_buffer);

        let stats = FrameStats {
            frame_index: self.frame_count,
            entities_drawn: summary.drawn,
            entities_skipped: summary.skipped,
            lights_bound: light_count,
        };
        self.frame_count += 1;
        log::trace!("Frame {} presented: {stats:?}", stats.frame_index);
        FrameOutcome::Presented(stats)
    }

    fn skip(missing: MissingResource) -> FrameOutcome {
        log::warn!("Skipping frame: missing {missing}");
        FrameOutcome::Skipped(missing)
    }

    /// Skip after a drawable was acquired; the drawable goes back unpresented
    fn skip_with_drawable(
        missing: MissingResource,
        drawable: DrawableHandle,
        backend: &mut dyn GpuBackend,
    ) -> FrameOutcome {
        log::warn!("Skipping frame: missing {missing}, discarding drawable {drawable:?}");
        backend.discard_drawable(drawable);
        FrameOutcome::Skipped(missing)
    }

    /// Follow a viewport size change
    ///
    /// Zero-sized viewports (minimised windows) are ignored. Otherwise the
    /// depth texture is recreated at the new size and the camera aspect
    /// becomes `width / height`. Repeating the same size changes nothing.
    pub fn resize(&mut self, width: u32, height: u32, backend: &mut dyn GpuBackend) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }

        if self.viewport != (width, height) || self.depth_texture.is_none() {
            if let Some(old) = self.depth_texture.take() {
                backend.release_texture(old);
            }
            match backend.create_texture(&TextureDescriptor::depth_target(width, height), None) {
                Ok(texture) => self.depth_texture = Some(texture),
                Err(e) => log::error!("Failed to create {width}x{height} depth texture: {e}"),
            }
            self.viewport = (width, height);
            log::debug!("Viewport resized to {width}x{height}");
        }

        if let Some(camera) = self.camera.as_mut() {
            camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    /// Release the depth texture and every cached texture
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(texture) = self.depth_texture.take() {
            backend.release_texture(texture);
        }
        self.materials.release_all(backend);
    }

    /// Active camera
    pub const fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    /// Mutable active camera
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Replace the camera; `None` makes every frame skip
    ///
    /// A new camera takes the current viewport's aspect ratio.
    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
        let (width, height) = self.viewport;
        if let (Some(camera), true) = (self.camera.as_mut(), width > 0 && height > 0) {
            camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    /// Colour the drawable is cleared to
    pub const fn clear_color(&self) -> [f64; 4] {
        self.clear_color
    }

    /// Change the clear colour
    pub fn set_clear_color(&mut self, color: [f64; 4]) {
        self.clear_color = color;
    }

    /// Current depth texture
    pub const fn depth_texture(&self) -> Option<TextureHandle> {
        self.depth_texture
    }

    /// Last non-zero viewport size
    pub const fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Pipeline cache, needed to spawn entities
    pub fn pipelines_mut(&mut self) -> &mut PipelineManager {
        &mut self.pipelines
    }

    /// Pipeline cache
    pub const fn pipelines(&self) -> &PipelineManager {
        &self.pipelines
    }

    /// Texture cache
    pub fn materials_mut(&mut self) -> &mut MaterialManager {
        &mut self.materials
    }

    /// Number of frames presented so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
