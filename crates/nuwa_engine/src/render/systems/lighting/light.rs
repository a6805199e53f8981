//! Light definitions and their GPU record

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{utils, Vec3};

/// Direction used when a light is given a zero-length direction
const DEFAULT_DIRECTION: [f32; 3] = [0.0, 0.0, -1.0];

/// Light model, with the integer codes the shaders switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LightType {
    /// Uniform light on every surface
    Ambient = 0,
    /// Parallel rays along `direction`
    Directional = 1,
    /// Omnidirectional light at `position`
    Point = 2,
}

/// A light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light model
    pub light_type: LightType,
    /// RGB color
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// World position (point lights)
    pub position: Vec3,
    direction: Vec3,
}

impl Light {
    /// Create a light; `direction` is normalized
    pub fn new(light_type: LightType, color: Vec3, intensity: f32, position: Vec3, direction: Vec3) -> Self {
        let mut light = Self {
            light_type,
            color,
            intensity,
            position,
            direction: Vec3::from(DEFAULT_DIRECTION),
        };
        light.set_direction(direction);
        light
    }

    /// Ambient light
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self::new(LightType::Ambient, color, intensity, Vec3::zeros(), Vec3::from(DEFAULT_DIRECTION))
    }

    /// Directional light shining along `direction`
    pub fn directional(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        Self::new(LightType::Directional, color, intensity, Vec3::zeros(), direction)
    }

    /// Point light at `position`
    pub fn point(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self::new(LightType::Point, color, intensity, position, Vec3::from(DEFAULT_DIRECTION))
    }

    /// Unit direction
    pub const fn direction(&self) -> &Vec3 {
        &self.direction
    }

    /// Set the direction, normalizing it
    ///
    /// A zero-length vector keeps the light pointing down `-Z`.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = utils::try_normalize(&direction).unwrap_or_else(|| {
            log::debug!("Zero-length light direction, using {DEFAULT_DIRECTION:?}");
            Vec3::from(DEFAULT_DIRECTION)
        });
    }
}

/// GPU layout of a light
///
/// Three 16-byte rows: `[type, color.rgb]`, `[intensity, position.xyz]`,
/// `[pad, direction.xyz]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightRecord {
    /// [`LightType`] code
    pub light_type: i32,
    /// RGB color
    pub color: [f32; 3],
    /// Intensity multiplier
    pub intensity: f32,
    /// World position
    pub position: [f32; 3],
    /// Alignment padding
    pub _padding: f32,
    /// Unit direction
    pub direction: [f32; 3],
}

impl From<&Light> for LightRecord {
    fn from(light: &Light) -> Self {
        Self {
            light_type: light.light_type as i32,
            color: light.color.into(),
            intensity: light.intensity,
            position: light.position.into(),
            _padding: 0.0,
            direction: light.direction.into(),
        }
    }
}
