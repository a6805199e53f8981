//! Time-based transform animation
//!
//! An [`Animator`] drives one component of a node's transform from the
//! value it had on the first update to a target, linearly over `duration`
//! seconds. Once progress reaches 1 the target is written exactly and the
//! animator goes inactive; it then leaves the transform alone until
//! [`Animator::reset`].

use crate::foundation::math::{utils, Quat, Transform, Unit, Vec3};

/// Relative slack when deciding that accumulated time has reached the duration
///
/// Summing many frame deltas rarely hits the duration bit-exactly.
const COMPLETION_TOLERANCE: f32 = 1e-5;

/// What an animator changes
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationKind {
    /// Rotate by `angle` radians about `axis`, composed after the starting rotation
    Rotation {
        /// Rotation axis; normalized on use
        axis: Vec3,
        /// Total angle in radians
        angle: f32,
    },
    /// Move by `offset` from the starting position
    Translation {
        /// Total displacement
        offset: Vec3,
    },
    /// Interpolate scale from the starting scale to `target`
    Scale {
        /// Final scale
        target: Vec3,
    },
}

/// Drives one transform component over time
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    kind: AnimationKind,
    duration: f32,
    elapsed: f32,
    active: bool,
    start: Option<Transform>,
}

impl Animator {
    /// Create an animator; a non-positive duration completes on the first update
    pub fn new(kind: AnimationKind, duration: f32) -> Self {
        if let AnimationKind::Rotation { axis, .. } = &kind {
            if utils::try_normalize(axis).is_none() {
                log::warn!("Rotation animator with zero-length axis will not rotate");
            }
        }
        Self {
            kind,
            duration,
            elapsed: 0.0,
            active: true,
            start: None,
        }
    }

    /// Rotation about `axis` by `angle` radians
    pub fn rotation(axis: Vec3, angle: f32, duration: f32) -> Self {
        Self::new(AnimationKind::Rotation { axis, angle }, duration)
    }

    /// Translation by `offset`
    pub fn translation(offset: Vec3, duration: f32) -> Self {
        Self::new(AnimationKind::Translation { offset }, duration)
    }

    /// Scale towards `target`
    pub fn scale_to(target: Vec3, duration: f32) -> Self {
        Self::new(AnimationKind::Scale { target }, duration)
    }

    /// Advance by `delta_time` seconds and apply the result to `transform`
    ///
    /// Negative or non-finite deltas do not advance time.
    pub fn update(&mut self, transform: &mut Transform, delta_time: f32) {
        if !self.active {
            return;
        }

        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }
        let progress = self.progress();
        let start = self.start.get_or_insert_with(|| transform.clone());

        match &self.kind {
            AnimationKind::Rotation { axis, angle } => {
                if let Some(axis) = utils::try_normalize(axis) {
                    let delta = Quat::from_axis_angle(&Unit::new_unchecked(axis), angle * progress);
                    transform.rotation = start.rotation * delta;
                }
            }
            AnimationKind::Translation { offset } => {
                transform.position = utils::lerp_vec3(&start.position, &(start.position + offset), progress);
            }
            AnimationKind::Scale { target } => {
                transform.scale = utils::lerp_vec3(&start.scale, target, progress);
            }
        }

        if progress >= 1.0 {
            self.active = false;
            log::trace!("Animation {:?} finished after {:.3}s", self.kind, self.elapsed);
        }
    }

    /// Restart from zero; the starting value is re-captured on the next update
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
        self.start = None;
    }

    /// Fraction of the animation completed, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration.is_nan() || self.duration <= 0.0 {
            return 1.0;
        }
        if self.elapsed >= self.duration * (1.0 - COMPLETION_TOLERANCE) {
            return 1.0;
        }
        utils::clamp(self.elapsed / self.duration, 0.0, 1.0)
    }

    /// Whether the animator still changes its target
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds accumulated since creation or the last reset
    pub const fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Configured duration in seconds
    pub const fn duration(&self) -> f32 {
        self.duration
    }

    /// What this animator changes
    pub const fn kind(&self) -> &AnimationKind {
        &self.kind
    }
}
