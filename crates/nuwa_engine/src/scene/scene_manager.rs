//! # Scene
//!
//! The [`Scene`] owns the transform hierarchy and decides which of its nodes
//! are entities: nodes with a [`Renderable`] that are updated and drawn every
//! frame. Entity order is insertion order and doubles as draw order.

use crate::foundation::math::{Mat4, Transform, Vec3};
use crate::render::api::{GpuBackend, RenderEncoder};
use crate::render::pipeline::{PipelineManager, ShaderPair};
use crate::render::LightingManager;

use super::geometry::EntityKind;
use super::renderable::Renderable;
use super::scene_graph::{Node, NodeId, SceneGraph};
use super::{SceneError, SceneResult};

/// Ambient colour of a new scene
pub const DEFAULT_AMBIENT_COLOR: [f32; 3] = [0.1, 0.1, 0.1];

/// Per-frame draw tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawSummary {
    /// Entities that issued a draw call
    pub drawn: usize,
    /// Entities skipped for a missing resource
    pub skipped: usize,
}

/// Entities, their hierarchy and the scene lights
#[derive(Debug)]
pub struct Scene {
    graph: SceneGraph,
    entities: Vec<NodeId>,
    lighting: Option<LightingManager>,
    /// Global ambient colour
    pub ambient_color: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            graph: SceneGraph::new(),
            entities: Vec::new(),
            lighting: Some(LightingManager::new()),
            ambient_color: Vec3::from(DEFAULT_AMBIENT_COLOR),
        }
    }
}

impl Scene {
    /// Empty scene with an empty lighting manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform hierarchy
    pub const fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable transform hierarchy, for parenting and non-entity nodes
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Entities in update and draw order
    pub fn entities(&self) -> &[NodeId] {
        &self.entities
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether `id` is in the entity list
    pub fn is_entity(&self, id: NodeId) -> bool {
        self.entities.contains(&id)
    }

    /// Scene lights, if lighting is enabled
    pub const fn lighting(&self) -> Option<&LightingManager> {
        self.lighting.as_ref()
    }

    /// Mutable scene lights
    pub fn lighting_mut(&mut self) -> Option<&mut LightingManager> {
        self.lighting.as_mut()
    }

    /// Replace the lighting manager, returning the old one so its buffer can be released
    pub fn set_lighting(&mut self, lighting: Option<LightingManager>) -> Option<LightingManager> {
        std::mem::replace(&mut self.lighting, lighting)
    }

    /// Create an entity node at the end of the entity list
    ///
    /// Geometry is generated and uploaded immediately. Allocation failures are
    /// logged and leave the entity without the failed resource; it is then
    /// skipped at draw time.
    pub fn spawn_entity(
        &mut self,
        name: impl Into<String>,
        kind: EntityKind,
        transform: Transform,
        backend: &mut dyn GpuBackend,
        pipelines: &mut PipelineManager,
    ) -> NodeId {
        self.spawn_entity_with_shaders(name, kind, ShaderPair::default(), transform, backend, pipelines)
    }

    /// [`spawn_entity`](Self::spawn_entity) with an explicit shader pair
    pub fn spawn_entity_with_shaders(
        &mut self,
        name: impl Into<String>,
        kind: EntityKind,
        shader_pair: ShaderPair,
        transform: Transform,
        backend: &mut dyn GpuBackend,
        pipelines: &mut PipelineManager,
    ) -> NodeId {
        let name = name.into();
        log::debug!("Spawning {} entity '{name}'", kind.name());
        let renderable = Renderable::new(kind, shader_pair, backend, pipelines);
        let id = self
            .graph
            .insert(Node::new(name).with_transform(transform).with_renderable(renderable));
        self.entities.push(id);
        id
    }

    /// Register an existing node as an entity
    ///
    /// Returns `Ok(false)` if it is already registered.
    ///
    /// # Errors
    /// [`SceneError::NodeNotFound`] for a stale handle, [`SceneError::NotAnEntity`]
    /// when the node carries no renderable.
    pub fn add_entity(&mut self, id: NodeId) -> SceneResult<bool> {
        let node = self.graph.node(id).ok_or(SceneError::NodeNotFound(id))?;
        if node.renderable().is_none() {
            return Err(SceneError::NotAnEntity(id));
        }
        if self.is_entity(id) {
            return Ok(false);
        }
        self.entities.push(id);
        Ok(true)
    }

    /// Take an entity out of the update and draw lists
    ///
    /// Removal is by identity: other entities with identical contents stay.
    /// The node and its GPU resources are kept; see
    /// [`destroy_entity`](Self::destroy_entity).
    pub fn remove_entity(&mut self, id: NodeId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|&entity| entity != id);
        self.entities.len() != before
    }

    /// Remove an entity, free its GPU buffers and delete its node
    ///
    /// Children of the node become roots.
    pub fn destroy_entity(&mut self, id: NodeId, backend: &mut dyn GpuBackend) -> bool {
        self.remove_entity(id);
        let Some(mut node) = self.graph.destroy_node(id) else {
            return false;
        };
        if let Some(renderable) = node.renderable_mut() {
            renderable.release(backend);
        }
        log::debug!("Destroyed entity '{}'", node.name);
        true
    }

    /// Regenerate an entity's geometry, for example a new terrain height or sky colour
    pub fn regenerate(&mut self, id: NodeId, kind: EntityKind, backend: &mut dyn GpuBackend) -> SceneResult<()> {
        let renderable = self.graph.renderable_mut(id).ok_or(SceneError::NotAnEntity(id))?;
        renderable.regenerate(kind, backend);
        Ok(())
    }

    /// Advance animators and behaviors
    ///
    /// Entities are visited in list order and each update covers the
    /// entity's subtree. An entity below another listed entity is reached
    /// through that ancestor and is not advanced a second time.
    pub fn update(&mut self, delta_time: f32) {
        let roots: Vec<NodeId> = self
            .entities
            .iter()
            .copied()
            .filter(|&id| !self.has_entity_ancestor(id))
            .collect();
        for id in roots {
            self.graph.update(id, delta_time);
        }
    }

    fn has_entity_ancestor(&self, id: NodeId) -> bool {
        let mut current = self.graph.parent(id);
        while let Some(ancestor) = current {
            if self.is_entity(ancestor) {
                return true;
            }
            current = self.graph.parent(ancestor);
        }
        false
    }

    /// Write every entity's uniforms from its current world matrix
    ///
    /// A failed write is logged; the entity then draws with last frame's data.
    pub fn update_uniforms(&self, view_projection: &Mat4, camera_position: &Vec3, backend: &mut dyn GpuBackend) {
        for &id in &self.entities {
            let (Some(renderable), Some(model)) = (self.graph.renderable(id), self.graph.world_matrix(id)) else {
                continue;
            };
            if let Err(e) = renderable.write_uniforms(&model, view_projection, camera_position, backend) {
                log::error!("Failed to update uniforms of {id:?}: {e}");
            }
        }
    }

    /// Draw every entity in list order
    pub fn draw(&self, encoder: &mut dyn RenderEncoder) -> DrawSummary {
        let mut summary = DrawSummary::default();
        for &id in &self.entities {
            let Some(renderable) = self.graph.renderable(id) else {
                log::warn!("Skipping {id:?}: no longer drawable");
                summary.skipped += 1;
                continue;
            };
            match renderable.draw(encoder) {
                Ok(()) => summary.drawn += 1,
                Err(_) => summary.skipped += 1,
            }
        }
        summary
    }

    /// Release the buffers of every renderable node and the light buffer
    ///
    /// Nodes taken out with [`remove_entity`](Self::remove_entity) still own
    /// their buffers and are released too.
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        for (_, renderable) in self.graph.renderables_mut() {
            renderable.release(backend);
        }
        if let Some(lighting) = self.lighting.as_mut() {
            lighting.release(backend);
        }
    }
}
