//! Active light list and its GPU buffer

use crate::foundation::math::Vec3;
use crate::render::api::{BackendResult, BufferHandle, GpuBackend};

use super::light::{Light, LightRecord};

/// Number of lights the shaders read; extra lights are ignored in insertion order
pub const MAX_UPLOADED_LIGHTS: usize = 3;

/// Identity of a light inside a [`LightingManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(u64);

/// Owns the scene's lights and the buffer they are uploaded to
///
/// Every mutation marks the buffer dirty. [`refresh`](Self::refresh) (called
/// once per frame by the render system) or an explicit
/// [`update_light_buffer`](Self::update_light_buffer) brings it up to date.
#[derive(Debug, Default)]
pub struct LightingManager {
    lights: Vec<(LightId, Light)>,
    next_id: u64,
    buffer: Option<BufferHandle>,
    buffer_len: usize,
    uploaded_count: usize,
    dirty: bool,
}

impl LightingManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a light at the end of the list
    pub fn add_light(&mut self, light: Light) -> LightId {
        self.next_id += 1;
        let id = LightId(self.next_id);
        log::debug!("Adding {:?} light {id:?}", light.light_type);
        self.lights.push((id, light));
        self.dirty = true;
        id
    }

    /// Remove the light with this identity; other lights with equal values are kept
    pub fn remove_light(&mut self, id: LightId) -> bool {
        let before = self.lights.len();
        self.lights.retain(|(light_id, _)| *light_id != id);
        let removed = self.lights.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Set every light's intensity
    pub fn adjust_intensity(&mut self, intensity: f32) {
        for (_, light) in &mut self.lights {
            light.intensity = intensity;
        }
        self.dirty = true;
    }

    /// Set every light's color
    pub fn set_color(&mut self, color: Vec3) {
        for (_, light) in &mut self.lights {
            light.color = color;
        }
        self.dirty = true;
    }

    /// Set every light's color back to white
    pub fn reset_color(&mut self) {
        self.set_color(Vec3::new(1.0, 1.0, 1.0));
    }

    /// Look up a light
    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.iter().find(|(light_id, _)| *light_id == id).map(|(_, light)| light)
    }

    /// Mutable access to a light; marks the buffer dirty
    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        let light = self
            .lights
            .iter_mut()
            .find(|(light_id, _)| *light_id == id)
            .map(|(_, light)| light);
        if light.is_some() {
            self.dirty = true;
        }
        light
    }

    /// Lights in insertion order
    pub fn lights(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.lights.iter().map(|(id, light)| (*id, light))
    }

    /// Number of lights, including ones beyond the upload cap
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether there are no lights
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// GPU records for the lights that will be uploaded
    pub fn light_records(&self) -> Vec<LightRecord> {
        self.lights
            .iter()
            .take(MAX_UPLOADED_LIGHTS)
            .map(|(_, light)| LightRecord::from(light))
            .collect()
    }

    /// Rebuild the light buffer from the current lights
    ///
    /// With no lights the buffer is released and [`buffer`](Self::buffer)
    /// returns `None`. A buffer of unchanged size is rewritten in place.
    pub fn update_light_buffer(&mut self, backend: &mut dyn GpuBackend) -> BackendResult<()> {
        let records = self.light_records();

        if records.is_empty() {
            self.release(backend);
            self.dirty = false;
            return Ok(());
        }

        let bytes: &[u8] = bytemuck::cast_slice(&records);
        match self.buffer {
            Some(buffer) if self.buffer_len == bytes.len() => backend.write_buffer(buffer, 0, bytes)?,
            _ => {
                self.release(backend);
                self.buffer = Some(backend.create_buffer("lights", bytes)?);
                self.buffer_len = bytes.len();
            }
        }

        self.uploaded_count = records.len();
        self.dirty = false;
        log::trace!("Uploaded {} of {} lights", self.uploaded_count, self.lights.len());
        Ok(())
    }

    /// Rebuild the buffer if anything changed since the last upload
    ///
    /// Failures are logged and the buffer stays dirty so the next frame retries.
    pub fn refresh(&mut self, backend: &mut dyn GpuBackend) {
        if !self.dirty {
            return;
        }
        if let Err(e) = self.update_light_buffer(backend) {
            log::error!("Failed to update light buffer: {e}");
        }
    }

    /// Free the light buffer
    pub fn release(&mut self, backend: &mut dyn GpuBackend) {
        if let Some(buffer) = self.buffer.take() {
            backend.release_buffer(buffer);
        }
        self.buffer_len = 0;
        self.uploaded_count = 0;
    }

    /// Current light buffer, if any lights have been uploaded
    pub const fn buffer(&self) -> Option<BufferHandle> {
        self.buffer
    }

    /// Number of records in the current buffer
    pub const fn uploaded_count(&self) -> usize {
        self.uploaded_count
    }

    /// Whether the buffer is stale
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}
