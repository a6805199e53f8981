//! Surface material

use crate::foundation::math::Vec3;
use crate::render::api::shader_types::texture_index;
use crate::render::api::{RenderEncoder, ShaderStages, TextureHandle};

/// Roughness restored by [`Material::reset_properties`]
pub const DEFAULT_ROUGHNESS: f32 = 0.5;

/// Metallic factor restored by [`Material::reset_properties`]
pub const DEFAULT_METALLIC: f32 = 0.0;

/// Surface properties for lighting and texturing
///
/// Scalar properties reach the shaders through the entity's
/// [`Uniforms`](super::Uniforms) record; [`bind`](Self::bind) only binds
/// the color texture.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color
    pub diffuse_color: Vec3,
    /// Specular highlight color
    pub specular_color: Vec3,
    /// Phong exponent
    pub shininess: f32,
    /// Microfacet roughness in `[0, 1]`
    pub roughness: f32,
    /// Metallic factor in `[0, 1]`
    pub metallic: f32,
    /// Self-illumination color
    pub emissive_color: Vec3,
    /// Environment reflection factor in `[0, 1]`
    pub reflectivity: f32,
    /// Color texture
    pub texture: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::new(1.0, 1.0, 1.0),
            specular_color: Vec3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
            roughness: DEFAULT_ROUGHNESS,
            metallic: DEFAULT_METALLIC,
            emissive_color: Vec3::zeros(),
            reflectivity: 0.0,
            texture: None,
        }
    }
}

impl Material {
    /// Untextured material with the given Phong terms
    pub fn new(diffuse_color: Vec3, specular_color: Vec3, shininess: f32) -> Self {
        Self {
            diffuse_color,
            specular_color,
            shininess,
            ..Self::default()
        }
    }

    /// Attach a color texture
    #[must_use]
    pub const fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Set roughness, clamped to `[0, 1]`
    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = roughness.clamp(0.0, 1.0);
    }

    /// Set metallic factor, clamped to `[0, 1]`
    pub fn set_metallic(&mut self, metallic: f32) {
        self.metallic = metallic.clamp(0.0, 1.0);
    }

    /// Restore roughness and metallic defaults
    pub fn reset_properties(&mut self) {
        self.roughness = DEFAULT_ROUGHNESS;
        self.metallic = DEFAULT_METALLIC;
    }

    /// Whether a texture is bound
    pub const fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Bind the color texture, if any, for the fragment stage
    pub fn bind(&self, encoder: &mut dyn RenderEncoder) {
        if let Some(texture) = self.texture {
            encoder.set_texture(ShaderStages::FRAGMENT, texture_index::COLOR, texture);
        }
    }
}
