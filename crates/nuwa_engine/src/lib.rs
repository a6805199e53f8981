//! # Nuwa Engine
//!
//! A small real-time 3D engine core: a scene-graph transform hierarchy,
//! animation, lighting and per-frame render orchestration on top of an
//! opaque GPU backend.
//!
//! ## Features
//!
//! - **Scene Graph**: arena-backed parent/child transforms with on-demand world matrices
//! - **Animation**: rotation, translation and scale animators plus simple steering behaviors
//! - **Lighting**: up to three ambient, directional or point lights uploaded as one buffer
//! - **Render System**: fixed-order frame loop with per-entity and per-frame skipping
//! - **Backends**: a [`GpuBackend`](render::GpuBackend) contract and an in-memory headless backend
//!
//! ## Quick Start
//!
//! ```rust
//! use nuwa_engine::prelude::*;
//!
//! let config = EngineConfig::default();
//! let mut backend = HeadlessBackend::new();
//! let mut renderer = RenderSystem::new(&config, &mut backend);
//! let mut scene = Scene::new();
//!
//! let triangle = scene.spawn_entity(
//!     "triangle",
//!     EntityKind::Triangle,
//!     Transform::identity(),
//!     &mut backend,
//!     renderer.pipelines_mut(),
//! );
//! scene
//!     .graph_mut()
//!     .attach_animator(triangle, Animator::rotation(Vec3::y(), 1.0, 2.0))
//!     .unwrap();
//!
//! let outcome = renderer.frame(&mut scene, 1.0 / 60.0, &mut backend);
//! assert!(outcome.is_presented());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{Config, EngineConfig},
        foundation::{
            math::{Mat4, Quat, Transform, Vec3},
            time::Timer,
        },
        render::{
            Camera, FrameOutcome, FrameStats, GpuBackend, HeadlessBackend, Light, LightingManager,
            Material, RenderSystem, ShaderPair,
        },
        scene::{Animator, Behavior, EntityKind, NodeId, Scene, SceneGraph},
    };
}
