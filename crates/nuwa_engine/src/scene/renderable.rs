//! Render payload carried by entity nodes

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::shader_types::buffer_index;
use crate::render::api::{BackendResult, BufferHandle, GpuBackend, PipelineHandle, RenderEncoder, ShaderStages};
use crate::render::pipeline::{PipelineManager, ShaderPair};
use crate::render::resources::{Material, Uniforms};
use crate::render::{MissingResource, PrimitiveType};

use super::geometry::{generate_vertices, EntityKind};

/// GPU resources and material for one drawable node
///
/// Resources that fail to allocate stay `None`; [`draw`](Self::draw) then
/// skips the entity instead of failing the frame.
#[derive(Debug)]
pub struct Renderable {
    kind: EntityKind,
    vertex_buffer: Option<BufferHandle>,
    vertex_count: u32,
    uniform_buffer: Option<BufferHandle>,
    shader_pair: ShaderPair,
    pipeline: Option<PipelineHandle>,
    /// Surface material, snapshotted into the uniforms every frame
    pub material: Material,
}

impl Renderable {
    /// Generate geometry for `kind` and allocate its buffers and pipeline
    pub fn new(
        kind: EntityKind,
        shader_pair: ShaderPair,
        backend: &mut dyn GpuBackend,
        pipelines: &mut PipelineManager,
    ) -> Self {
        let material = kind.default_material();
        let pipeline = pipelines.get_or_create(shader_pair, backend);

        let zeroed = Uniforms::new(&Mat4::identity(), &Mat4::identity(), &Vec3::zeros(), &material);
        let uniform_buffer = backend
            .create_buffer(&format!("{}-uniforms", kind.name()), bytemuck::bytes_of(&zeroed))
            .map_err(|e| log::error!("Failed to create {} uniform buffer: {e}", kind.name()))
            .ok();

        let mut renderable = Self {
            kind,
            vertex_buffer: None,
            vertex_count: 0,
            uniform_buffer,
            shader_pair,
            pipeline,
            material,
        };
        renderable.upload_vertices(backend);
        renderable
    }

    /// Replace the geometry, for example to change terrain height or sky color
    ///
    /// The material is kept.
    pub fn regenerate(&mut self, kind: EntityKind, backend: &mut dyn GpuBackend) {
        self.kind = kind;
        self.upload_vertices(backend);
    }

    fn upload_vertices(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(buffer) = self.vertex_buffer.take() {
            backend.release_buffer(buffer);
        }
        self.vertex_count = 0;

        let vertices = generate_vertices(&self.kind);
        if vertices.is_empty() {
            log::warn!("{} produced no vertices", self.kind.name());
            return;
        }

        let Ok(vertex_count) = u32::try_from(vertices.len()) else {
            log::error!("{} produced {} vertices, more than one draw can cover", self.kind.name(), vertices.len());
            return;
        };

        let label = format!("{}-vertices", self.kind.name());
        match backend.create_buffer(&label, bytemuck::cast_slice(&vertices)) {
            Ok(buffer) => {
                self.vertex_buffer = Some(buffer);
                self.vertex_count = vertex_count;
                log::debug!("Uploaded {} {} vertices", vertices.len(), self.kind.name());
            }
            Err(e) => log::error!("Failed to create {label}: {e}"),
        }
    }

    /// Write this frame's uniform record
    ///
    /// Does nothing when the uniform buffer is missing; `draw` reports that.
    pub fn write_uniforms(
        &self,
        model: &Mat4,
        view_projection: &Mat4,
        camera_position: &Vec3,
        backend: &mut dyn GpuBackend,
    ) -> BackendResult<()> {
        let Some(buffer) = self.uniform_buffer else {
            return Ok(());
        };
        let uniforms = Uniforms::new(model, view_projection, camera_position, &self.material);
        backend.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms))
    }

    /// Bind resources and issue the draw call
    ///
    /// # Errors
    /// Returns the first missing resource; nothing is recorded in that case.
    pub fn draw(&self, encoder: &mut dyn RenderEncoder) -> Result<(), MissingResource> {
        let vertex_buffer = self.vertex_buffer.ok_or(MissingResource::VertexBuffer);
        let uniform_buffer = self.uniform_buffer.ok_or(MissingResource::UniformBuffer);
        let pipeline = self.pipeline.ok_or(MissingResource::Pipeline);

        let (vertex_buffer, uniform_buffer, pipeline) = match (vertex_buffer, uniform_buffer, pipeline) {
            (Ok(v), Ok(u), Ok(p)) => (v, u, p),
            (Err(missing), _, _) | (_, Err(missing), _) | (_, _, Err(missing)) => {
                log::warn!("Skipping {} draw: missing {missing}", self.kind.name());
                return Err(missing);
            }
        };

        encoder.set_pipeline(pipeline);
        encoder.set_buffer(ShaderStages::VERTEX, buffer_index::MESH_POSITIONS, vertex_buffer, 0);
        encoder.set_buffer(
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            buffer_index::UNIFORMS,
            uniform_buffer,
            0,
        );
        self.material.bind(encoder);
        encoder.draw(self.primitive_type(), 0, self.vertex_count);
        Ok(())
    }

    /// Free GPU buffers; the pipeline belongs to the pipeline manager
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        for buffer in [self.vertex_buffer.take(), self.uniform_buffer.take()].into_iter().flatten() {
            backend.release_buffer(buffer);
        }
        self.vertex_count = 0;
    }

    /// Shape and generation parameters
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Topology used by `draw`
    pub const fn primitive_type(&self) -> PrimitiveType {
        self.kind.primitive_type()
    }

    /// Number of vertices drawn
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Vertex buffer, if allocated
    pub const fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    /// Uniform buffer, if allocated
    pub const fn uniform_buffer(&self) -> Option<BufferHandle> {
        self.uniform_buffer
    }

    /// Shader pair this entity draws with
    pub const fn shader_pair(&self) -> ShaderPair {
        self.shader_pair
    }

    /// Pipeline resolved at construction
    pub const fn pipeline(&self) -> Option<PipelineHandle> {
        self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{HeadlessBackend, RecordedCommand};
    use crate::render::api::{CommandBufferHandle, DrawableHandle, RenderPassDescriptor, TextureDescriptor};

    fn encode<F: FnOnce(&mut dyn RenderEncoder)>(backend: &mut HeadlessBackend, f: F) {
        let depth = backend.create_texture(&TextureDescriptor::depth_target(4, 4), None).unwrap();
        let pass = RenderPassDescriptor {
            clear_color: [0.0; 4],
            depth_texture: depth,
            clear_depth: 1.0,
        };
        let mut encoder = backend
            .begin_render_pass(CommandBufferHandle(0), DrawableHandle(0), &pass)
            .unwrap();
        f(encoder.as_mut());
        encoder.end_encoding();
    }

    #[test]
    fn draw_binds_fixed_slots() {
        let mut backend = HeadlessBackend::new();
        let mut pipelines = PipelineManager::new();
        let renderable = Renderable::new(EntityKind::Triangle, ShaderPair::Basic, &mut backend, &mut pipelines);

        encode(&mut backend, |encoder| renderable.draw(encoder).unwrap());

        assert_eq!(backend.draw_calls(), vec![(PrimitiveType::Triangle, 0, 3)]);
        assert!(backend.commands().contains(&RecordedCommand::SetBuffer {
            stages: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            index: buffer_index::UNIFORMS,
            buffer: renderable.uniform_buffer().unwrap(),
        }));
        assert!(backend.commands().contains(&RecordedCommand::SetBuffer {
            stages: ShaderStages::VERTEX,
            index: buffer_index::MESH_POSITIONS,
            buffer: renderable.vertex_buffer().unwrap(),
        }));
    }

    #[test]
    fn missing_vertex_buffer_skips_cleanly() {
        let mut backend = HeadlessBackend::new();
        let mut pipelines = PipelineManager::new();
        let renderable = Renderable::new(
            EntityKind::Grid { size: 1.0, spacing: -1.0 },
            ShaderPair::Basic,
            &mut backend,
            &mut pipelines,
        );

        let mut result = Ok(());
        encode(&mut backend, |encoder| result = renderable.draw(encoder));

        assert_eq!(result, Err(MissingResource::VertexBuffer));
        assert!(backend.draw_calls().is_empty());
    }

    #[test]
    fn failed_allocation_leaves_resources_absent() {
        let mut backend = HeadlessBackend::new();
        backend.fail_buffer_creation = true;
        backend.fail_pipeline_creation = true;
        let mut pipelines = PipelineManager::new();

        let renderable = Renderable::new(EntityKind::Triangle, ShaderPair::Phong, &mut backend, &mut pipelines);

        assert!(renderable.vertex_buffer().is_none());
        assert!(renderable.uniform_buffer().is_none());
        assert!(renderable.pipeline().is_none());
        assert_eq!(renderable.vertex_count(), 0);
    }

    #[test]
    fn uniforms_hold_model_and_material() {
        let mut backend = HeadlessBackend::new();
        let mut pipelines = PipelineManager::new();
        let renderable = Renderable::new(EntityKind::Triangle, ShaderPair::Basic, &mut backend, &mut pipelines);
        let model = Mat4::new_translation(&Vec3::new(0.0, 1.0, 0.0));

        renderable
            .write_uniforms(&model, &Mat4::identity(), &Vec3::new(3.0, 5.0, 8.0), &mut backend)
            .unwrap();

        let bytes = backend.buffer_contents(renderable.uniform_buffer().unwrap()).unwrap();
        let uniforms: Uniforms = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(uniforms.model[3], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(uniforms.camera_position, [3.0, 5.0, 8.0]);
        assert_eq!(uniforms.material.diffuse_color, [1.0, 0.5, 0.5]);
    }

    #[test]
    fn regenerate_swaps_vertex_buffer() {
        let mut backend = HeadlessBackend::new();
        let mut pipelines = PipelineManager::new();
        let mut renderable = Renderable::new(
            EntityKind::SkyPlane { color: [1.0; 4] },
            ShaderPair::Basic,
            &mut backend,
            &mut pipelines,
        );
        let before = backend.live_buffer_count();

        renderable.regenerate(EntityKind::SkyPlane { color: [0.2, 0.4, 0.9, 1.0] }, &mut backend);

        assert_eq!(backend.live_buffer_count(), before);
        assert_eq!(renderable.vertex_count(), 4);

        renderable.release(&mut backend);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn oversized_regeneration_drops_geometry() {
        let mut backend = HeadlessBackend::new();
        let mut pipelines = PipelineManager::new();
        let mut renderable = Renderable::new(
            EntityKind::Grid { size: 4.0, spacing: 1.0 },
            ShaderPair::Basic,
            &mut backend,
            &mut pipelines,
        );
        assert_eq!(renderable.vertex_count(), 5 * 4);

        renderable.regenerate(
            EntityKind::Grid {
                size: f32::INFINITY,
                spacing: 1.0,
            },
            &mut backend,
        );

        assert!(renderable.vertex_buffer().is_none());
        assert_eq!(renderable.vertex_count(), 0);
        let mut result = Ok(());
        encode(&mut backend, |encoder| result = renderable.draw(encoder));
        assert_eq!(result, Err(MissingResource::VertexBuffer));
    }
}
