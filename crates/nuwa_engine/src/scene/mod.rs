//! # Scene
//!
//! Transform hierarchy, entities and everything that moves them.
//!
//! - [`SceneGraph`]: arena of [`Node`]s linked by [`NodeId`] handles
//! - [`Animator`] and [`Behavior`]: per-node motion advanced by the update traversal
//! - [`Renderable`]: the GPU payload that turns a node into an entity
//! - [`Scene`]: entity list, lights and per-frame update
//! - [`proximity`]: adjustments driven by the viewer's distance
//! - [`engagement`]: dwell timers and the response to a lingering viewer

use thiserror::Error;

use crate::render::RenderError;

pub mod animator;
pub mod behavior;
pub mod engagement;
pub mod geometry;
pub mod proximity;
pub mod renderable;
pub mod scene_graph;
pub mod scene_manager;

pub use animator::{AnimationKind, Animator};
pub use behavior::Behavior;
pub use engagement::{EngagementResponder, EngagementTracker};
pub use geometry::{generate_vertices, EntityKind};
pub use renderable::Renderable;
pub use scene_graph::{Node, NodeId, SceneGraph};
pub use scene_manager::{DrawSummary, Scene};

/// Scene graph and entity errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Handle does not refer to a live node
    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    /// Attaching would make a node its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// Node has no renderable payload
    #[error("Node {0:?} is not an entity")]
    NotAnEntity(NodeId),

    /// GPU backend failure
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
