//! # Engine Configuration
//!
//! Serializable settings for the viewport, the default camera, asset lookup
//! and logging. Every field has a default, so a partial file (or none at all)
//! is valid.
//!
//! ```toml
//! clear_color = [0.7, 0.7, 1.0, 1.0]
//!
//! [viewport]
//! width = 1280
//! height = 720
//!
//! [camera]
//! position = [3.0, 5.0, 8.0]
//! fov_degrees = 45.0
//! projection = "Perspective"
//!
//! [logging]
//! filter = "nuwa_engine=debug"
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::{utils, Vec3};
use crate::render::primitives::{Camera, ProjectionKind};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial drawable size
    pub viewport: ViewportConfig,
    /// Color the render pass clears to
    pub clear_color: [f64; 4],
    /// Initial camera placement and projection
    pub camera: CameraConfig,
    /// Asset lookup settings
    pub assets: AssetConfig,
    /// Logger settings
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: ViewportConfig::default(),
            clear_color: [0.7, 0.7, 1.0, 1.0],
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

/// Drawable size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ViewportConfig {
    /// Width divided by height, or `None` when either side is zero
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }
}

/// Camera defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in world space
    pub position: [f32; 3],
    /// Look-at target in world space
    pub target: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Projection kind
    pub projection: ProjectionKind,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [3.0, 5.0, 8.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            projection: ProjectionKind::Perspective,
        }
    }
}

impl CameraConfig {
    /// Build a camera from these settings for the given viewport
    pub fn build_camera(&self, viewport: &ViewportConfig) -> Camera {
        let mut camera = Camera {
            position: Vec3::from(self.position),
            target: Vec3::from(self.target),
            fov: utils::deg_to_rad(self.fov_degrees),
            near: self.near,
            far: self.far,
            projection: self.projection,
            ..Camera::default()
        };
        if let Some(aspect) = viewport.aspect_ratio() {
            camera.set_aspect_ratio(aspect);
        }
        camera
    }
}

/// Asset lookup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory searched for `<name>.png` textures
    pub texture_root: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            texture_root: "assets/textures".to_string(),
        }
    }
}

/// Logger settings
///
/// `filter` follows the `env_logger` filter syntax (e.g. `"info"` or
/// `"nuwa_engine=debug"`). When absent, `RUST_LOG` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [viewport]
            width = 800
            height = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.viewport.width, 800);
        assert_eq!(config.viewport.height, 600);
        assert_eq!(config.clear_color, [0.7, 0.7, 1.0, 1.0]);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.logging.filter, None);
    }

    #[test]
    fn ron_round_trip_through_file() {
        let path = std::env::temp_dir().join(format!("nuwa_config_{}.ron", std::process::id()));
        let mut config = EngineConfig::default();
        config.camera.projection = ProjectionKind::Orthographic;
        config.logging.filter = Some("nuwa_engine=trace".to_string());

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = EngineConfig::load_from_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let result = EngineConfig::default().save_to_file("settings.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = EngineConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn camera_takes_viewport_aspect() {
        let viewport = ViewportConfig {
            width: 1600,
            height: 900,
        };
        let camera = CameraConfig::default().build_camera(&viewport);
        assert_relative_eq!(camera.aspect, 16.0 / 9.0, epsilon = 1e-6);
        assert_relative_eq!(camera.fov, utils::deg_to_rad(45.0), epsilon = 1e-6);
    }

    #[test]
    fn zero_sized_viewport_has_no_aspect() {
        let viewport = ViewportConfig {
            width: 0,
            height: 720,
        };
        assert_eq!(viewport.aspect_ratio(), None);
    }
}
