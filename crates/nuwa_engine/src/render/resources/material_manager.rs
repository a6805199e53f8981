//! Texture loading and caching for materials
//!
//! Textures are looked up by name as `<texture_root>/<name>.png`, decoded
//! with the `image` crate, flipped so row 0 is the bottom of the image,
//! and uploaded once. Later requests for the same name hit the cache.
//! A texture that cannot be found or decoded is logged and the material
//! stays untextured.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::Material;
use crate::render::api::{GpuBackend, PixelFormat, TextureDescriptor, TextureHandle, TextureUsage};
use crate::render::RenderError;

/// Loads textures and attaches them to materials
#[derive(Debug)]
pub struct MaterialManager {
    texture_root: PathBuf,
    textures: HashMap<String, TextureHandle>,
}

impl MaterialManager {
    /// Create a manager that resolves texture names under `texture_root`
    pub fn new(texture_root: impl Into<PathBuf>) -> Self {
        Self {
            texture_root: texture_root.into(),
            textures: HashMap::new(),
        }
    }

    /// Directory searched for textures
    pub fn texture_root(&self) -> &Path {
        &self.texture_root
    }

    /// Load (or fetch from cache) the texture called `name`
    pub fn load_texture(&mut self, name: &str, backend: &mut dyn GpuBackend) -> Option<TextureHandle> {
        if let Some(&texture) = self.textures.get(name) {
            return Some(texture);
        }

        let path = self.texture_root.join(format!("{name}.png"));
        let result = image::open(&path)
            .map_err(|e| RenderError::TextureLoad(format!("{}: {e}", path.display())))
            .and_then(|image| Self::upload(name, &image, backend));
        self.cache_result(name, result)
    }

    /// Decode an in-memory PNG and cache it under `name`
    pub fn load_texture_from_memory(
        &mut self,
        name: &str,
        bytes: &[u8],
        backend: &mut dyn GpuBackend,
    ) -> Option<TextureHandle> {
        if let Some(&texture) = self.textures.get(name) {
            return Some(texture);
        }

        let result = image::load_from_memory(bytes)
            .map_err(|e| RenderError::TextureLoad(format!("{name}: {e}")))
            .and_then(|image| Self::upload(name, &image, backend));
        self.cache_result(name, result)
    }

    /// Load `name` and attach it to `material`
    ///
    /// Returns whether the material ended up textured. On failure any
    /// existing texture on the material is left in place.
    pub fn apply_texture(&mut self, material: &mut Material, name: &str, backend: &mut dyn GpuBackend) -> bool {
        if let Some(texture) = self.load_texture(name, backend) {
            material.texture = Some(texture);
        }
        material.has_texture()
    }

    /// Cached texture for `name`
    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    /// Release every cached texture
    pub fn release_all(&mut self, backend: &mut dyn GpuBackend) {
        for (_, texture) in self.textures.drain() {
            backend.release_texture(texture);
        }
    }

    fn cache_result(&mut self, name: &str, result: Result<TextureHandle, RenderError>) -> Option<TextureHandle> {
        match result {
            Ok(texture) => {
                log::debug!("Loaded texture '{name}' as {texture:?}");
                self.textures.insert(name.to_string(), texture);
                Some(texture)
            }
            Err(e) => {
                log::warn!("Texture '{name}' unavailable, rendering untextured: {e}");
                None
            }
        }
    }

    fn upload(name: &str, image: &DynamicImage, backend: &mut dyn GpuBackend) -> Result<TextureHandle, RenderError> {
        let rgba = image.flipv().to_rgba8();
        let descriptor = TextureDescriptor {
            label: name.to_string(),
            width: rgba.width(),
            height: rgba.height(),
            format: PixelFormat::Rgba8Unorm,
            usage: TextureUsage::ShaderRead,
            mipmapped: true,
        };
        backend.create_texture(&descriptor, Some(rgba.as_raw()))
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new("assets/textures")
    }
}
