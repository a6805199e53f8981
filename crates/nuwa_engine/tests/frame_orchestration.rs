//! Frame orchestration against the headless backend.

use approx::assert_relative_eq;
use nuwa_engine::render::api::shader_types::buffer_index;
use nuwa_engine::render::backends::RecordedCommand;
use nuwa_engine::render::systems::lighting::{LightRecord, LightType, MAX_UPLOADED_LIGHTS};
use nuwa_engine::render::{MissingResource, PrimitiveType};
use nuwa_engine::prelude::*;

fn reference_scene(backend: &mut HeadlessBackend, renderer: &mut RenderSystem) -> Scene {
    let mut scene = Scene::new();
    for (name, kind) in [
        ("triangle", EntityKind::Triangle),
        ("grid", EntityKind::Grid { size: 10.0, spacing: 0.5 }),
        ("axis", EntityKind::Axis { length: 2.0 }),
    ] {
        scene.spawn_entity(name, kind, Transform::identity(), backend, renderer.pipelines_mut());
    }
    scene
}

fn light_records(backend: &HeadlessBackend, scene: &Scene) -> Vec<LightRecord> {
    let buffer = scene.lighting().and_then(LightingManager::buffer).unwrap();
    backend
        .buffer_contents(buffer)
        .unwrap()
        .chunks_exact(std::mem::size_of::<LightRecord>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

#[test]
fn draws_entities_in_insertion_order() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = reference_scene(&mut backend, &mut renderer);
    backend.clear_commands();

    let outcome = renderer.frame(&mut scene, 1.0 / 60.0, &mut backend);

    assert!(outcome.is_presented());
    let primitives: Vec<PrimitiveType> = backend.draw_calls().iter().map(|(p, _, _)| *p).collect();
    assert_eq!(
        primitives,
        vec![PrimitiveType::Triangle, PrimitiveType::Line, PrimitiveType::Line]
    );
    assert_eq!(backend.committed_frames(), 1);
}

#[test]
fn only_first_three_point_lights_are_uploaded() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = Scene::new();
    let lighting = scene.lighting_mut().unwrap();
    for i in 0..5 {
        let intensity = i as f32 + 1.0;
        lighting.add_light(Light::point(Vec3::new(1.0, 1.0, 1.0), intensity, Vec3::new(i as f32, 0.0, 0.0)));
    }

    let outcome = renderer.frame(&mut scene, 0.0, &mut backend);

    assert_eq!(outcome.stats().unwrap().lights_bound, MAX_UPLOADED_LIGHTS);
    let buffer = scene.lighting().unwrap().buffer().unwrap();
    assert_eq!(backend.buffer_contents(buffer).unwrap().len(), 3 * 48);

    let records = light_records(&backend, &scene);
    let intensities: Vec<f32> = records.iter().map(|r| r.intensity).collect();
    assert_eq!(intensities, vec![1.0, 2.0, 3.0]);
    assert!(records.iter().all(|r| r.light_type == LightType::Point as i32));

    assert!(backend.commands().contains(&RecordedCommand::SetBytes {
        stages: nuwa_engine::render::api::ShaderStages::FRAGMENT,
        index: buffer_index::LIGHT_COUNT,
        bytes: 3i32.to_ne_bytes().to_vec(),
    }));
}

#[test]
fn removing_every_light_releases_the_buffer() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = Scene::new();
    let id = scene
        .lighting_mut()
        .unwrap()
        .add_light(Light::directional(Vec3::new(1.0, 1.0, 1.0), 0.8, Vec3::new(0.0, -1.0, 0.0)));
    renderer.frame(&mut scene, 0.0, &mut backend);
    assert!(scene.lighting().unwrap().buffer().is_some());

    assert!(scene.lighting_mut().unwrap().remove_light(id));
    let outcome = renderer.frame(&mut scene, 0.0, &mut backend);

    assert!(scene.lighting().unwrap().buffer().is_none());
    assert_eq!(outcome.stats().unwrap().lights_bound, 0);
    assert_eq!(backend.live_buffer_count(), 0);
}

#[test]
fn frame_without_depth_texture_is_skipped() {
    let mut backend = HeadlessBackend::new();
    let config = EngineConfig {
        viewport: nuwa_engine::core::ViewportConfig { width: 0, height: 0 },
        ..EngineConfig::default()
    };
    let mut renderer = RenderSystem::new(&config, &mut backend);
    let mut scene = reference_scene(&mut backend, &mut renderer);
    assert!(renderer.depth_texture().is_none());

    let outcome = renderer.frame(&mut scene, 1.0 / 60.0, &mut backend);

    assert_eq!(outcome, FrameOutcome::Skipped(MissingResource::DepthTexture));
    assert!(backend.draw_calls().is_empty());
    assert_eq!(backend.committed_frames(), 0);
    assert_eq!(renderer.frame_count(), 0);

    renderer.resize(640, 480, &mut backend);
    assert!(renderer.frame(&mut scene, 1.0 / 60.0, &mut backend).is_presented());
}

#[test]
fn repeated_resize_is_idempotent() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);

    renderer.resize(1024, 768, &mut backend);
    let depth = renderer.depth_texture();
    let aspect = renderer.camera().unwrap().aspect;
    renderer.resize(1024, 768, &mut backend);

    assert_eq!(renderer.depth_texture(), depth);
    assert_relative_eq!(renderer.camera().unwrap().aspect, aspect);
    assert_relative_eq!(aspect, 1024.0 / 768.0);
    assert_eq!(backend.live_texture_count(), 1);
}

#[test]
fn entity_without_vertices_is_skipped_alone() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = reference_scene(&mut backend, &mut renderer);
    scene.spawn_entity(
        "flat",
        EntityKind::Terrain { grid_size: 1, max_height: 1.0 },
        Transform::identity(),
        &mut backend,
        renderer.pipelines_mut(),
    );

    let stats = *renderer.frame(&mut scene, 0.0, &mut backend).stats().unwrap();

    assert_eq!(stats.entities_drawn, 3);
    assert_eq!(stats.entities_skipped, 1);
}

#[test]
fn uniforms_follow_the_hierarchy() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = Scene::new();
    let parent = scene.spawn_entity(
        "parent",
        EntityKind::Triangle,
        Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
        &mut backend,
        renderer.pipelines_mut(),
    );
    let child = scene.spawn_entity(
        "child",
        EntityKind::Triangle,
        Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),
        &mut backend,
        renderer.pipelines_mut(),
    );
    scene.graph_mut().add_child(parent, child).unwrap();

    renderer.frame(&mut scene, 0.0, &mut backend);

    let buffer = scene.graph().renderable(child).unwrap().uniform_buffer().unwrap();
    let uniforms: nuwa_engine::render::Uniforms = bytemuck::pod_read_unaligned(backend.buffer_contents(buffer).unwrap());
    assert_eq!(uniforms.model[3], [2.0, 1.0, 0.0, 1.0]);
    let camera = renderer.camera().unwrap();
    assert_eq!(uniforms.camera_position, <[f32; 3]>::from(camera.position));
}

/// Length of the xyz part of row `row` of a column-major matrix
fn row_norm(matrix: &[[f32; 4]; 4], row: usize) -> f32 {
    (0..3).map(|col| matrix[col][row] * matrix[col][row]).sum::<f32>().sqrt()
}

#[test]
fn resize_and_regenerate_reach_the_next_frame() {
    let mut backend = HeadlessBackend::new();
    let mut renderer = RenderSystem::new(&EngineConfig::default(), &mut backend);
    let mut scene = Scene::new();
    let terrain = scene.spawn_entity(
        "terrain",
        EntityKind::Terrain { grid_size: 4, max_height: 1.0 },
        Transform::identity(),
        &mut backend,
        renderer.pipelines_mut(),
    );
    renderer.frame(&mut scene, 0.0, &mut backend);
    let old_depth = renderer.depth_texture().unwrap();

    renderer.resize(1600, 900, &mut backend);
    scene
        .regenerate(terrain, EntityKind::Terrain { grid_size: 6, max_height: 2.0 }, &mut backend)
        .unwrap();
    backend.clear_commands();
    assert!(renderer.frame(&mut scene, 0.0, &mut backend).is_presented());

    let depth = renderer.depth_texture().unwrap();
    assert_ne!(depth, old_depth);
    assert!(backend.texture_descriptor(old_depth).is_none());
    let descriptor = backend.texture_descriptor(depth).unwrap();
    assert_eq!((descriptor.width, descriptor.height), (1600, 900));
    assert!(matches!(
        backend.commands().first(),
        Some(RecordedCommand::BeginPass { depth_texture, .. }) if *depth_texture == depth
    ));

    assert_eq!(backend.draw_calls(), vec![(PrimitiveType::Triangle, 0, 5 * 5 * 6)]);

    // The view matrix is a rigid transform, so the first two rows of
    // `projection * view` keep the projection's x and y scales
    let buffer = scene.graph().renderable(terrain).unwrap().uniform_buffer().unwrap();
    let uniforms: nuwa_engine::render::Uniforms = bytemuck::pod_read_unaligned(backend.buffer_contents(buffer).unwrap());
    let camera = renderer.camera().unwrap();
    let focal = 1.0 / (camera.fov * 0.5).tan();
    assert_relative_eq!(row_norm(&uniforms.view_projection, 1), focal, epsilon = 1e-4);
    assert_relative_eq!(row_norm(&uniforms.view_projection, 0), focal * 900.0 / 1600.0, epsilon = 1e-4);
}
