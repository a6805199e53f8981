//! Responses to the viewer's distance from an entity
//!
//! Each helper takes the distance between the viewer and an entity and
//! adjusts one thing: light intensity or colour, material surface, scale or
//! the texture picked from a set.

use crate::foundation::math::{Transform, Vec3};
use crate::render::api::TextureHandle;
use crate::render::{LightingManager, Material};

/// Distance at which lights reach their minimum intensity
pub const LIGHTING_FALLOFF_DISTANCE: f32 = 50.0;
/// Lights never dim below this intensity
pub const MIN_PROXIMITY_INTENSITY: f32 = 0.2;
/// Closer than this, lights turn warm
pub const LIGHTING_TRIGGER_DISTANCE: f32 = 15.0;
/// Colour used while the viewer is inside the trigger distance
pub const WARM_LIGHT_COLOR: [f32; 3] = [1.0, 0.7, 0.5];
/// Closer than this, materials turn rough and metallic
pub const MATERIAL_TRIGGER_DISTANCE: f32 = 20.0;
/// Distance at which the scale factor reaches 1
pub const SCALE_DISTANCE: f32 = 30.0;
/// Far entities never shrink below this factor
pub const MIN_PROXIMITY_SCALE: f32 = 0.1;
/// Distance covered by each texture in a proximity set
pub const TEXTURE_STEP_DISTANCE: f32 = 25.0;

/// Dim every light with distance: `max(0.2, 1 - distance / 50)`
pub fn adjust_lighting(lighting: &mut LightingManager, distance: f32) {
    let intensity = (1.0 - distance / LIGHTING_FALLOFF_DISTANCE).max(MIN_PROXIMITY_INTENSITY);
    lighting.adjust_intensity(intensity);
}

/// Warm the lights when the viewer is close, white otherwise
pub fn proximity_lighting_trigger(lighting: &mut LightingManager, distance: f32) {
    if distance < LIGHTING_TRIGGER_DISTANCE {
        lighting.set_color(Vec3::from(WARM_LIGHT_COLOR));
    } else {
        lighting.reset_color();
    }
}

/// Rough, slightly metallic surface up close; defaults further away
pub fn update_material_for_proximity(material: &mut Material, distance: f32) {
    if distance < MATERIAL_TRIGGER_DISTANCE {
        material.set_roughness(0.8);
        material.set_metallic(0.4);
    } else {
        material.reset_properties();
    }
}

/// Uniform scale factor `1 + (1 - distance / 30)`, floored at [`MIN_PROXIMITY_SCALE`]
pub fn proximity_scale_factor(distance: f32) -> f32 {
    (1.0 + (1.0 - distance / SCALE_DISTANCE)).max(MIN_PROXIMITY_SCALE)
}

/// Apply [`proximity_scale_factor`] to all three axes
pub fn scale_for_proximity(transform: &mut Transform, distance: f32) {
    let factor = proximity_scale_factor(distance);
    transform.scale = Vec3::new(factor, factor, factor);
}

/// Pick one texture per 25 units of distance, cycling through `textures`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn texture_for_proximity(textures: &[TextureHandle], distance: f32) -> Option<TextureHandle> {
    if textures.is_empty() {
        return None;
    }
    // float-to-int `as` saturates, so NaN and negative distances land on 0
    let step = (distance / TEXTURE_STEP_DISTANCE) as usize;
    textures.get(step % textures.len()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Light;
    use approx::assert_relative_eq;

    fn manager_with_light() -> LightingManager {
        let mut lighting = LightingManager::new();
        lighting.add_light(Light::point(Vec3::new(1.0, 1.0, 1.0), 1.0, Vec3::zeros()));
        lighting
    }

    fn intensity(lighting: &LightingManager) -> f32 {
        lighting.lights().next().unwrap().1.intensity
    }

    #[test]
    fn lighting_dims_with_distance_down_to_floor() {
        let mut lighting = manager_with_light();
        adjust_lighting(&mut lighting, 25.0);
        assert_relative_eq!(intensity(&lighting), 0.5);
        adjust_lighting(&mut lighting, 500.0);
        assert_relative_eq!(intensity(&lighting), MIN_PROXIMITY_INTENSITY);
        assert!(lighting.is_dirty());
    }

    #[test]
    fn lighting_trigger_switches_color() {
        let mut lighting = manager_with_light();
        proximity_lighting_trigger(&mut lighting, 5.0);
        assert_eq!(lighting.lights().next().unwrap().1.color, Vec3::from(WARM_LIGHT_COLOR));
        proximity_lighting_trigger(&mut lighting, 15.0);
        assert_eq!(lighting.lights().next().unwrap().1.color, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn material_responds_and_resets() {
        let mut material = Material::default();
        update_material_for_proximity(&mut material, 10.0);
        assert_relative_eq!(material.roughness, 0.8);
        assert_relative_eq!(material.metallic, 0.4);
        update_material_for_proximity(&mut material, 40.0);
        assert_eq!(material, Material::default());
    }

    #[test]
    fn scale_grows_up_close() {
        let mut transform = Transform::identity();
        scale_for_proximity(&mut transform, 0.0);
        assert_relative_eq!(transform.scale, Vec3::new(2.0, 2.0, 2.0));
        scale_for_proximity(&mut transform, 30.0);
        assert_relative_eq!(transform.scale, Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(proximity_scale_factor(1000.0), MIN_PROXIMITY_SCALE);
    }

    #[test]
    fn textures_cycle_by_distance_band() {
        let textures = [TextureHandle(1), TextureHandle(2)];
        assert_eq!(texture_for_proximity(&textures, 10.0), Some(TextureHandle(1)));
        assert_eq!(texture_for_proximity(&textures, 30.0), Some(TextureHandle(2)));
        assert_eq!(texture_for_proximity(&textures, 55.0), Some(TextureHandle(1)));
        assert_eq!(texture_for_proximity(&textures, -3.0), Some(TextureHandle(1)));
        assert_eq!(texture_for_proximity(&[], 10.0), None);
    }
}
