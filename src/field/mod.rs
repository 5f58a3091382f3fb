pub mod accumulator;

pub use accumulator::{DensityGrid, FieldAccumulator, FieldSettings, Metaball};

use bevy::prelude::*;

use crate::core::components::{Blob, PhysicsBody};
use crate::core::system::system_order::FrameSet;
use crate::physics::world::PhysicsWorld;

pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, accumulate_field.in_set(FrameSet::Field));
    }
}

/// Snapshot blob positions from the physics world (read only) into the density grid.
pub fn accumulate_field(
    world: Option<Res<PhysicsWorld>>,
    field: Option<ResMut<FieldAccumulator>>,
    q_blobs: Query<(&Blob, &PhysicsBody)>,
) {
    let (Some(world), Some(mut field)) = (world, field) else {
        return;
    };
    field.refresh(q_blobs.iter().filter_map(|(blob, body)| {
        world.translation(**body).map(|position| Metaball {
            position,
            strength: blob.strength,
            subtract: blob.subtract,
            color: blob.color,
        })
    }));
}
