pub mod float_drift;
pub mod walls;
pub mod world;

pub use float_drift::{float_drift_impulse, FloatDrift};
pub use walls::{wall_specs, FLOOR_TOP};
pub use world::{
    BodyHandle, BodyKind, BodySpec, ColliderShape, PhysicsSettings, PhysicsWorld, Timestep,
};

use bevy::prelude::*;

use crate::core::components::{Blob, PhysicsBody};
use crate::core::system::system_order::FrameSet;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FloatDrift>()
            .add_systems(
                Update,
                (apply_float_drift, step_physics, sync_body_transforms)
                    .chain()
                    .in_set(FrameSet::Physics),
            )
            .add_systems(Last, release_world_on_exit);
    }
}

/// Push every float blob back toward the origin before the world steps.
pub fn apply_float_drift(
    time: Res<Time>,
    drift: Res<FloatDrift>,
    world: Option<ResMut<PhysicsWorld>>,
    q_blobs: Query<(&Blob, &PhysicsBody)>,
) {
    let Some(mut world) = world else { return };
    let dt = world.cap_delta(time.delta_secs());
    if dt <= 0.0 {
        return;
    }
    for (blob, body) in &q_blobs {
        if !blob.float {
            continue;
        }
        if let Some(position) = world.translation(**body) {
            world.apply_impulse(**body, float_drift_impulse(position, dt, drift.strength));
        }
    }
}

pub fn step_physics(time: Res<Time>, world: Option<ResMut<PhysicsWorld>>) {
    if let Some(mut world) = world {
        world.step(time.delta_secs());
    }
}

/// Mirror body poses onto entity transforms (inspection only; the field reads the world).
pub fn sync_body_transforms(
    world: Option<Res<PhysicsWorld>>,
    mut q_bodies: Query<(&PhysicsBody, &mut Transform)>,
) {
    let Some(world) = world else { return };
    for (body, mut transform) in &mut q_bodies {
        if let Some(pose) = world.transform(**body) {
            transform.translation = pose.translation;
            transform.rotation = pose.rotation;
        }
    }
}

/// Drop the world (and every body in it) once the app is shutting down.
fn release_world_on_exit(mut ev_exit: EventReader<AppExit>, mut commands: Commands) {
    if ev_exit.read().next().is_some() {
        debug!("releasing physics world");
        commands.remove_resource::<PhysicsWorld>();
    }
}
