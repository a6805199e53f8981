//! # 3D Camera System
//!
//! Look-at camera with perspective or orthographic projection.
//!
//! ## Coordinate System
//! Right-handed and Y-up. The view matrix looks down `-Z` in view space and
//! the perspective projection maps depth to `[-1, 1]`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// Width in world units covered by the orthographic projection
pub const ORTHOGRAPHIC_VIEW_WIDTH: f32 = 10.0;

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionKind {
    /// Perspective projection driven by `fov`
    #[default]
    Perspective,
    /// Orthographic projection [`ORTHOGRAPHIC_VIEW_WIDTH`] units wide
    Orthographic,
}

/// 3D Camera for perspective and orthographic projections
///
/// Matrices are computed on demand from the public fields, so mutating a
/// field takes effect on the next `get_*_matrix` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Vertical field of view in radians (perspective only)
    pub fov: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Projection model
    pub projection: ProjectionKind,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    /// Create an orthographic camera looking at the origin
    pub fn orthographic(position: Vec3, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            aspect,
            near,
            far,
            projection: ProjectionKind::Orthographic,
            ..Self::default()
        }
    }

    /// Update camera position in world space
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {position:?}");
    }

    /// Update camera target (look-at point)
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {target:?}");
    }

    /// Set target and up vector together
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {target:?}, up: {up:?}");
    }

    /// Update camera aspect ratio for viewport changes
    ///
    /// Only logs changes larger than 0.01 to keep resize storms quiet.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view transform
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, self.up)
    }

    /// View-to-clip transform for the current projection kind
    pub fn get_projection_matrix(&self) -> Mat4 {
        match self.projection {
            ProjectionKind::Perspective => Mat4::perspective(self.fov, self.aspect, self.near, self.far),
            ProjectionKind::Orthographic => Mat4::orthographic(
                ORTHOGRAPHIC_VIEW_WIDTH,
                ORTHOGRAPHIC_VIEW_WIDTH / self.aspect,
                self.near,
                self.far,
            ),
        }
    }

    /// `projection * view`
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }
}

impl Default for Camera {
    /// Perspective camera at (0, 0, -5) looking at the origin, 45° FOV, square aspect
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            fov: 45.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
            projection: ProjectionKind::Perspective,
        }
    }
}
