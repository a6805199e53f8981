//! Simple steering behaviors
//!
//! A [`Behavior`] moves a node's local position a little every update. It
//! runs after the node's animator in the update traversal. There is no
//! physics here: behaviors only write positions.

use crate::foundation::math::Vec3;

/// Starting drift velocity for wandering nodes
const WANDER_VELOCITY: [f32; 3] = [0.5, 0.0, 0.5];

/// Per-node movement rule
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Behavior {
    /// Stay put
    #[default]
    Idle,
    /// Drift on the XZ plane and turn back when leaving `±bounds`
    Wander {
        /// Half extents on X and Z (Y is ignored)
        bounds: Vec3,
        /// Current velocity
        direction: Vec3,
    },
    /// Visit `points` in order at `speed` units per second, looping
    Patrol {
        /// Waypoints in local space
        points: Vec<Vec3>,
        /// Movement speed
        speed: f32,
        /// Index of the waypoint being approached
        next: usize,
    },
}

impl Behavior {
    /// Wander within `bounds`
    pub fn wander(bounds: Vec3) -> Self {
        Self::Wander {
            bounds,
            direction: Vec3::from(WANDER_VELOCITY),
        }
    }

    /// Patrol between `points`
    pub fn patrol(points: Vec<Vec3>, speed: f32) -> Self {
        Self::Patrol {
            points,
            speed,
            next: 0,
        }
    }

    /// Move `position` for one step of `delta_time` seconds
    pub fn update(&mut self, position: &mut Vec3, delta_time: f32) {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return;
        }

        match self {
            Self::Idle => {}
            Self::Wander { bounds, direction } => {
                *position += *direction * delta_time;
                if position.x.abs() > bounds.x || position.z.abs() > bounds.z {
                    *direction = -*direction;
                }
            }
            Self::Patrol { points, speed, next } => {
                let Some(target) = points.get(*next).copied() else {
                    return;
                };
                let to_target = target - *position;
                let step = *speed * delta_time;
                let distance = to_target.norm();
                if distance <= step {
                    *position = target;
                    *next = (*next + 1) % points.len();
                } else {
                    *position += to_target * (step / distance);
                }
            }
        }
    }
}
