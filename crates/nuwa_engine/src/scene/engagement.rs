//! Viewer engagement
//!
//! [`EngagementTracker`] measures how long the viewer has stayed close to
//! each tracked node. [`EngagementResponder`] turns that dwell time into
//! scene changes: engaged nodes drift upward, and once the viewer lingers
//! past a threshold the node plays its engagement animation and the scene
//! lights brighten a step.

use std::collections::HashMap;

use crate::foundation::math::Vec3;

use super::animator::Animator;
use super::scene_graph::{NodeId, SceneGraph};
use super::scene_manager::Scene;

/// Name under which the engagement animation is triggered
pub const ENGAGEMENT_ANIMATION: &str = "engagement";

/// Seconds of continuous proximity before a node responds
pub const DEFAULT_ENGAGEMENT_SECS: f32 = 5.0;

/// Upward drift of an engaged node, in units per second
pub const ENGAGED_DRIFT_SPEED: f32 = 0.05;

/// Rise performed by the engagement animation
pub const ENGAGEMENT_RISE: f32 = 0.1;

/// Length of the engagement animation in seconds
pub const ENGAGEMENT_ANIMATION_SECS: f32 = 1.0;

/// Light intensity added per triggered engagement
pub const EFFECT_INTENSITY_STEP: f32 = 0.1;

/// Ceiling for the boosted light intensity
pub const MAX_EFFECT_INTENSITY: f32 = 2.0;

/// Dwell timers for nodes near the viewer
#[derive(Debug, Clone)]
pub struct EngagementTracker {
    /// Viewer distance under which a node counts as engaged
    pub distance: f32,
    tracked: Vec<NodeId>,
    dwell: HashMap<NodeId, f32>,
}

impl EngagementTracker {
    /// Track nothing yet; nodes closer than `distance` will count as engaged
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            tracked: Vec::new(),
            dwell: HashMap::new(),
        }
    }

    /// Start timing `id`; returns `false` if it is already tracked
    pub fn track(&mut self, id: NodeId) -> bool {
        if self.tracked.contains(&id) {
            return false;
        }
        self.tracked.push(id);
        true
    }

    /// Stop timing `id` and forget its dwell time
    pub fn untrack(&mut self, id: NodeId) -> bool {
        self.dwell.remove(&id);
        let before = self.tracked.len();
        self.tracked.retain(|&tracked| tracked != id);
        self.tracked.len() != before
    }

    /// Tracked nodes in registration order
    pub fn tracked(&self) -> &[NodeId] {
        &self.tracked
    }

    /// Measure every tracked node against the viewer position
    ///
    /// Nodes within range gain `delta_time` of dwell; nodes out of range drop
    /// back to zero. Nodes that no longer exist are untracked. Returns the
    /// nodes in range this frame, in registration order.
    pub fn update(&mut self, graph: &SceneGraph, viewer: &Vec3, delta_time: f32) -> Vec<NodeId> {
        let step = if delta_time.is_finite() && delta_time > 0.0 { delta_time } else { 0.0 };
        let dwell = &mut self.dwell;
        let distance = self.distance;
        let mut engaged = Vec::new();

        self.tracked.retain(|&id| {
            let Some(world) = graph.world_matrix(id) else {
                log::debug!("Untracking stale node {id:?}");
                dwell.remove(&id);
                return false;
            };
            if (world.column(3).xyz() - viewer).norm() < distance {
                *dwell.entry(id).or_insert(0.0) += step;
                engaged.push(id);
            } else {
                dwell.remove(&id);
            }
            true
        });
        engaged
    }

    /// Seconds the viewer has stayed in range of `id` without leaving
    pub fn dwell(&self, id: NodeId) -> f32 {
        self.dwell.get(&id).copied().unwrap_or(0.0)
    }

    /// Nodes whose dwell exceeds `threshold_secs`, in registration order
    pub fn engaged(&self, threshold_secs: f32) -> impl Iterator<Item = NodeId> + '_ {
        self.tracked
            .iter()
            .copied()
            .filter(move |&id| self.dwell(id) > threshold_secs)
    }

    /// Clear every dwell timer
    pub fn reset(&mut self) {
        self.dwell.clear();
    }
}

/// Reacts to engaged nodes by moving them and brightening the lights
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementResponder {
    /// Dwell in seconds before the engagement animation plays
    pub trigger_secs: f32,
    /// Intensity written to every scene light when an engagement triggers
    pub effect_intensity: f32,
}

impl Default for EngagementResponder {
    fn default() -> Self {
        Self {
            trigger_secs: DEFAULT_ENGAGEMENT_SECS,
            effect_intensity: 1.0,
        }
    }
}

impl EngagementResponder {
    /// Responder that triggers after `trigger_secs` of dwell
    pub fn new(trigger_secs: f32) -> Self {
        Self {
            trigger_secs,
            ..Self::default()
        }
    }

    /// Apply this frame's response to the nodes `tracker` reported as engaged
    ///
    /// Returns the nodes whose engagement animation started this frame.
    pub fn respond(
        &mut self,
        scene: &mut Scene,
        tracker: &EngagementTracker,
        engaged: &[NodeId],
        delta_time: f32,
    ) -> Vec<NodeId> {
        let mut triggered = Vec::new();
        for &id in engaged {
            let graph = scene.graph_mut();
            let Some(transform) = graph.transform_mut(id) else {
                continue;
            };
            transform.position.y += ENGAGED_DRIFT_SPEED * delta_time.max(0.0);

            if tracker.dwell(id) <= self.trigger_secs {
                continue;
            }
            let animation = Animator::translation(Vec3::new(0.0, ENGAGEMENT_RISE, 0.0), ENGAGEMENT_ANIMATION_SECS);
            if let Ok(true) = graph.trigger_animation(id, ENGAGEMENT_ANIMATION, animation) {
                triggered.push(id);
            }
        }

        if !triggered.is_empty() {
            self.effect_intensity = (self.effect_intensity + EFFECT_INTENSITY_STEP).min(MAX_EFFECT_INTENSITY);
            if let Some(lighting) = scene.lighting_mut() {
                lighting.adjust_intensity(self.effect_intensity);
            }
            log::debug!(
                "{} node(s) engaged, light intensity now {:.2}",
                triggered.len(),
                self.effect_intensity
            );
        }
        triggered
    }
}
