use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::{rngs::StdRng, SeedableRng};

use blob_lamp::core::components::{Blob, PhysicsBody};
use blob_lamp::core::config::SceneConfig;
use blob_lamp::field::FieldAccumulator;
use blob_lamp::physics::{float_drift_impulse, PhysicsWorld, FLOOR_TOP};
use blob_lamp::rendering::isosurface::upload::new_surface_mesh;
use blob_lamp::rendering::materials::materials::transmission_material;
use blob_lamp::scene::SceneDescription;
use blob_lamp::surface::SurfaceExtractor;
use blob_lamp::{RngSeed, SimulationPlugin};

#[test]
fn blobs_stay_above_the_floor_for_a_second() {
    let cfg = SceneConfig::default();
    let description = SceneDescription::from_config(&cfg, &mut StdRng::seed_from_u64(2024));
    let mut scene = description.instantiate_physics().expect("default scene is valid");
    assert_eq!(scene.blobs.len(), 10);

    let dt = 1.0 / 60.0;
    for _ in 0..60 {
        let capped = scene.world.cap_delta(dt);
        for (blob, handle) in &scene.blobs {
            if !blob.float {
                continue;
            }
            let p = scene.world.translation(*handle).unwrap();
            scene
                .world
                .apply_impulse(*handle, float_drift_impulse(p, capped, scene.drift_strength));
        }
        scene.world.step(dt);
    }

    for (_, handle) in &scene.blobs {
        let p = scene.world.translation(*handle).unwrap();
        assert!(p.is_finite(), "{p}");
        assert!(p.y >= FLOOR_TOP - 0.05, "blob sank through the floor: {p}");
        assert!(p.z.abs() < 1.0, "blob escaped between the plates: {p}");
    }
}

#[test]
fn blobs_fall_onto_the_floor_without_drift() {
    let mut cfg = SceneConfig::default();
    cfg.blobs.float = false;
    cfg.pointer.enabled = false;
    let description = SceneDescription::from_config(&cfg, &mut StdRng::seed_from_u64(5));
    let mut scene = description.instantiate_physics().expect("valid scene");
    for _ in 0..180 {
        scene.world.step(1.0 / 60.0);
    }
    let lowest = scene
        .blobs
        .iter()
        .map(|(_, h)| scene.world.translation(*h).unwrap().y)
        .fold(f32::INFINITY, f32::min);
    assert!(lowest < 0.0, "blobs should have dropped, lowest {lowest}");
    assert!(lowest >= FLOOR_TOP - 0.05, "lowest {lowest}");
}

fn headless_app(seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(SceneConfig::default());
    app.insert_resource(RngSeed(seed));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.add_plugins(SimulationPlugin);
    app
}

#[test]
fn one_update_produces_a_surface_from_same_frame_positions() {
    let mut app = headless_app(7);
    app.update();
    app.update();

    {
        let world = app.world();
        assert_eq!(world.resource::<PhysicsWorld>().body_count(), 16);
        assert_eq!(world.resource::<FieldAccumulator>().blobs().len(), 10);
    }

    let app_world = app.world_mut();
    let handles: Vec<PhysicsBody> = app_world
        .query_filtered::<&PhysicsBody, With<Blob>>()
        .iter(app_world)
        .copied()
        .collect();
    let world = app.world();
    let physics = world.resource::<PhysicsWorld>();
    let field = world.resource::<FieldAccumulator>();
    for body in handles {
        let p = physics.translation(*body).unwrap();
        assert!(
            field.blobs().iter().any(|b| b.position == p),
            "field snapshot is stale for body at {p}"
        );
    }

    let extractor = world.resource::<SurfaceExtractor>();
    assert!(!extractor.mesh().is_empty());
    assert!(extractor.mesh().triangle_count() <= 10_000);
    assert!(!extractor.truncated());
}

#[test]
fn default_surface_can_sample_the_transmission_mask() {
    let mut app = headless_app(11);
    app.update();
    app.update();

    assert!(SceneConfig::default().material.buffer.is_active());
    let surface = app.world().resource::<SurfaceExtractor>().mesh();
    assert!(!surface.is_empty());
    assert_eq!(surface.uvs.len(), surface.positions.len());

    let mesh = new_surface_mesh(surface, true);
    assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
    let material = transmission_material(&SceneConfig::default().material, Some(Handle::default()));
    assert!(material.specular_transmission_texture.is_some());
}

#[test]
fn same_seed_same_surface() {
    let mut a = headless_app(99);
    let mut b = headless_app(99);
    for _ in 0..3 {
        a.update();
        b.update();
    }
    let ma = a.world().resource::<SurfaceExtractor>().mesh();
    let mb = b.world().resource::<SurfaceExtractor>().mesh();
    assert_eq!(ma.triangle_count(), mb.triangle_count());
    assert_eq!(ma.positions, mb.positions);
}
