use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::core::components::{PhysicsBody, PointerBody, RngSeed};
use crate::core::config::SceneConfig;
use crate::core::system::system_order::SetupSet;
use crate::field::FieldAccumulator;
use crate::physics::FloatDrift;
use crate::scene::description::SceneDescription;
use crate::surface::SurfaceExtractor;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (describe_scene, instantiate_scene).chain().in_set(SetupSet::Scene),
        );
    }
}

/// Seed precedence: an explicit [`RngSeed`] resource, then `seed` from config, then entropy.
fn describe_scene(mut commands: Commands, cfg: Res<SceneConfig>, seed: Option<Res<RngSeed>>) {
    let seed = seed
        .map(|s| s.0)
        .or(cfg.seed)
        .unwrap_or_else(rand::random::<u64>);
    info!(seed, "building scene description");
    let mut rng = StdRng::seed_from_u64(seed);
    commands.insert_resource(RngSeed(seed));
    commands.insert_resource(SceneDescription::from_config(&cfg, &mut rng));
}

/// Physics world first, then the field and extractor, then one entity per body.
fn instantiate_scene(mut commands: Commands, description: Res<SceneDescription>) {
    let scene = match description.instantiate_physics() {
        Ok(scene) => scene,
        Err(e) => {
            error!("scene instantiation failed: {e:#}");
            return;
        }
    };
    info!(
        blobs = scene.blobs.len(),
        walls = scene.walls.len(),
        pointer = scene.pointer.is_some(),
        resolution = scene.field.resolution,
        "scene instantiated"
    );

    for (i, (blob, handle)) in scene.blobs.iter().enumerate() {
        let translation = scene.world.translation(*handle).unwrap_or_default();
        commands.spawn((
            Name::new(format!("Blob {i}")),
            *blob,
            PhysicsBody(*handle),
            Transform::from_translation(translation),
        ));
    }
    if let Some(handle) = scene.pointer {
        commands.spawn((
            Name::new("Pointer"),
            PointerBody,
            PhysicsBody(handle),
            Transform::default(),
        ));
    }

    commands.insert_resource(FieldAccumulator::new(scene.field));
    commands.insert_resource(SurfaceExtractor::new(scene.extract));
    commands.insert_resource(FloatDrift {
        strength: scene.drift_strength,
    });
    commands.insert_resource(scene.world);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::Blob;
    use crate::physics::PhysicsWorld;

    #[test]
    fn startup_builds_world_and_entities() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins((crate::core::system::system_order::FrameOrderPlugin, ScenePlugin));
        app.insert_resource(SceneConfig::default());
        app.insert_resource(RngSeed(9));
        app.update();

        let world = app.world();
        assert_eq!(world.resource::<PhysicsWorld>().body_count(), 16);
        assert!(world.get_resource::<FieldAccumulator>().is_some());
        assert!(world.get_resource::<SurfaceExtractor>().is_some());
        assert_eq!(world.resource::<RngSeed>().0, 9);

        let app_world = app.world_mut();
        let blobs = app_world.query::<(&Blob, &PhysicsBody)>().iter(app_world).count();
        assert_eq!(blobs, 10);
        let pointers = app_world
            .query_filtered::<&PhysicsBody, With<PointerBody>>()
            .iter(app_world)
            .count();
        assert_eq!(pointers, 1);
    }

    #[test]
    fn config_seed_is_used_without_override() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins((crate::core::system::system_order::FrameOrderPlugin, ScenePlugin));
        let cfg = SceneConfig {
            seed: Some(1234),
            ..default()
        };
        app.insert_resource(cfg);
        app.update();
        assert_eq!(app.world().resource::<RngSeed>().0, 1234);
    }
}
