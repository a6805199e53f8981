//! Scene lighting
//!
//! [`Light`] is the CPU-side description, [`LightRecord`] its 48-byte GPU
//! form, and [`LightingManager`] owns the active lights together with the
//! buffer the shaders read them from.

pub mod light;
pub mod lighting_manager;

pub use light::{Light, LightRecord, LightType};
pub use lighting_manager::{LightId, LightingManager, MAX_UPLOADED_LIGHTS};
