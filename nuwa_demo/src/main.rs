//! Nuwa reference scene
//!
//! Builds the reference scene (a spinning triangle with a wandering
//! companion, a ground grid, axis lines, rolling terrain and a sky plane lit
//! by a directional and an ambient light) and drives it with an orbiting
//! camera against the headless backend. The triangle responds when the
//! camera lingers near it.
//!
//! Usage: `nuwa_demo [config.toml|config.ron] [frames]`

use nuwa_engine::config::ConfigError;
use nuwa_engine::foundation::logging;
use nuwa_engine::foundation::math::constants;
use nuwa_engine::prelude::*;
use nuwa_engine::render::FrameOutcome;
use nuwa_engine::scene::{proximity, EngagementResponder, EngagementTracker, SceneError};
use thiserror::Error;

/// Frames rendered when no count is given
const DEFAULT_FRAMES: u64 = 240;
/// Fixed simulation step
const FRAME_DT: f32 = 1.0 / 60.0;
/// Camera orbit radius around the origin
const ORBIT_RADIUS: f32 = 10.0;
/// Camera height while orbiting
const ORBIT_HEIGHT: f32 = 2.0;
/// Orbit angle advanced per frame, in radians
const ORBIT_STEP: f32 = 0.01;
/// Terrain lattice size
const TERRAIN_SIZE: u32 = 32;
/// Camera distance at which the triangle counts as engaged
const ENGAGEMENT_DISTANCE: f32 = 12.0;
/// Seconds of engagement before the triangle reacts
const ENGAGEMENT_TRIGGER_SECS: f32 = 2.0;
/// Sky colour after the mid-run regeneration
const DUSK_SKY: [f32; 4] = [0.9, 0.5, 0.3, 1.0];

#[derive(Error, Debug)]
enum DemoError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene setup failed: {0}")]
    Scene(#[from] SceneError),

    #[error("Invalid frame count '{0}'")]
    FrameCount(String),
}

struct DemoApp {
    backend: HeadlessBackend,
    renderer: RenderSystem,
    scene: Scene,
    timer: Timer,
    engagement: EngagementTracker,
    responder: EngagementResponder,
    triangle: NodeId,
    sky: NodeId,
    camera_angle: f32,
    presented: u64,
    skipped: u64,
}

impl DemoApp {
    fn new(config: &EngineConfig) -> Result<Self, DemoError> {
        log::info!("Creating Nuwa demo...");
        let mut backend = HeadlessBackend::new();
        let mut renderer = RenderSystem::new(config, &mut backend);
        let mut scene = Scene::new();

        let triangle = scene.spawn_entity_with_shaders(
            "triangle",
            EntityKind::Triangle,
            ShaderPair::Phong,
            Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
            &mut backend,
            renderer.pipelines_mut(),
        );
        scene
            .graph_mut()
            .attach_animator(triangle, Animator::rotation(Vec3::y(), constants::TAU, 4.0))?;

        let companion = scene.spawn_entity(
            "companion",
            EntityKind::Triangle,
            Transform::new(Vec3::new(1.5, 0.0, 0.0), Quat::identity(), Vec3::new(0.3, 0.3, 0.3)),
            &mut backend,
            renderer.pipelines_mut(),
        );
        scene.graph_mut().add_child(triangle, companion)?;
        scene
            .graph_mut()
            .set_behavior(companion, Behavior::wander(Vec3::new(2.0, 0.0, 2.0)))?;

        scene.spawn_entity(
            "grid",
            EntityKind::Grid { size: 10.0, spacing: 0.5 },
            Transform::identity(),
            &mut backend,
            renderer.pipelines_mut(),
        );
        scene.spawn_entity(
            "axis",
            EntityKind::Axis { length: 2.0 },
            Transform::identity(),
            &mut backend,
            renderer.pipelines_mut(),
        );
        let half = TERRAIN_SIZE as f32 * 0.5;
        scene.spawn_entity(
            "terrain",
            EntityKind::Terrain { grid_size: TERRAIN_SIZE, max_height: 1.5 },
            Transform::from_position(Vec3::new(-half, -1.0, -half)),
            &mut backend,
            renderer.pipelines_mut(),
        );
        let sky = scene.spawn_entity(
            "sky",
            EntityKind::SkyPlane { color: [0.5, 0.7, 1.0, 1.0] },
            Transform::identity(),
            &mut backend,
            renderer.pipelines_mut(),
        );

        if let Some(lighting) = scene.lighting_mut() {
            lighting.add_light(Light::directional(Vec3::new(1.0, 1.0, 1.0), 0.8, Vec3::new(0.0, -1.0, 0.0)));
            lighting.add_light(Light::ambient(Vec3::new(0.5, 0.5, 0.5), 0.2));
        }

        let mut engagement = EngagementTracker::new(ENGAGEMENT_DISTANCE);
        engagement.track(triangle);

        log::info!("Scene ready with {} entities", scene.entity_count());
        Ok(Self {
            backend,
            renderer,
            scene,
            timer: Timer::new(),
            engagement,
            responder: EngagementResponder::new(ENGAGEMENT_TRIGGER_SECS),
            triangle,
            sky,
            camera_angle: 0.0,
            presented: 0,
            skipped: 0,
        })
    }

    fn orbit_camera(&mut self) {
        self.camera_angle += ORBIT_STEP;
        if self.camera_angle >= constants::TAU {
            self.camera_angle = 0.0;
        }
        if let Some(camera) = self.renderer.camera_mut() {
            camera.set_position(Vec3::new(
                ORBIT_RADIUS * self.camera_angle.cos(),
                ORBIT_HEIGHT,
                ORBIT_RADIUS * self.camera_angle.sin(),
            ));
            camera.look_at(Vec3::zeros(), Vec3::y());
        }
    }

    fn apply_proximity(&mut self) {
        let Some(camera) = self.renderer.camera() else {
            return;
        };
        let Some(world) = self.scene.graph().world_matrix(self.triangle) else {
            return;
        };
        let triangle_position = world.column(3).xyz();
        let distance = (camera.position - triangle_position).norm();

        if let Some(lighting) = self.scene.lighting_mut() {
            proximity::adjust_lighting(lighting, distance);
            proximity::proximity_lighting_trigger(lighting, distance);
        }
        if let Some(renderable) = self.scene.graph_mut().renderable_mut(self.triangle) {
            proximity::update_material_for_proximity(&mut renderable.material, distance);
        }
    }

    fn apply_engagement(&mut self) {
        let Some(viewer) = self.renderer.camera().map(|camera| camera.position) else {
            return;
        };
        let delta_time = self.timer.delta_time();
        let engaged = self.engagement.update(self.scene.graph(), &viewer, delta_time);
        let triggered = self
            .responder
            .respond(&mut self.scene, &self.engagement, &engaged, delta_time);
        for id in triggered {
            log::info!(
                "Camera lingered {:.1}s near {id:?}, lights at {:.2}",
                self.engagement.dwell(id),
                self.responder.effect_intensity
            );
        }
    }

    fn run(&mut self, frames: u64) -> Result<(), DemoError> {
        log::info!("Running {frames} frames...");
        for frame in 0..frames {
            self.timer.advance(FRAME_DT);
            self.orbit_camera();
            self.apply_proximity();
            self.apply_engagement();

            if frame == frames / 2 {
                log::info!("Simulating a window resize and dusk sky");
                self.renderer.resize(1600, 900, &mut self.backend);
                self.scene
                    .regenerate(self.sky, EntityKind::SkyPlane { color: DUSK_SKY }, &mut self.backend)?;
            }

            match self.renderer.frame(&mut self.scene, self.timer.delta_time(), &mut self.backend) {
                FrameOutcome::Presented(stats) => {
                    self.presented += 1;
                    if stats.frame_index % 60 == 0 {
                        log::info!(
                            "Frame {}: {} drawn, {} skipped, {} lights",
                            stats.frame_index,
                            stats.entities_drawn,
                            stats.entities_skipped,
                            stats.lights_bound
                        );
                    }
                }
                FrameOutcome::Skipped(missing) => {
                    self.skipped += 1;
                    log::warn!("Frame {frame} skipped: missing {missing}");
                }
            }
            self.backend.clear_commands();
        }
        Ok(())
    }

    fn shutdown(mut self) {
        log::info!(
            "Demo finished: {} presented, {} skipped, {:.1} simulated FPS over {:.2}s",
            self.presented,
            self.skipped,
            self.timer.average_fps(),
            self.timer.total_time()
        );
        self.scene.release(&mut self.backend);
        self.renderer.release(&mut self.backend);
        log::debug!(
            "{} buffers and {} textures still alive after release",
            self.backend.live_buffer_count(),
            self.backend.live_texture_count()
        );
    }
}

fn main() -> Result<(), DemoError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::load_or_default(path)?,
        None => EngineConfig::default(),
    };
    logging::init(&config.logging);

    let frames = match args.next() {
        Some(count) => count.parse().map_err(|_| DemoError::FrameCount(count))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Starting Nuwa demo");
    let mut app = DemoApp::new(&config)?;
    app.run(frames)?;
    app.shutdown();
    Ok(())
}
