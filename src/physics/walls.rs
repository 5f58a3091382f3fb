//! Static colliders bounding the play volume: a floor, two sloped side
//! walls that funnel blobs toward the centre, and thin back/front plates.
use std::f32::consts::FRAC_PI_6;

use bevy::prelude::*;

use super::world::{BodySpec, ColliderShape};

/// World-space height of the floor's upper face.
pub const FLOOR_TOP: f32 = -0.55;

const FLOOR_CENTRE_Y: f32 = -1.55;
const SIDE_OFFSET_X: f32 = 1.45;
const PLATE_OFFSET_Z: f32 = 1.15;

pub fn wall_specs() -> [BodySpec; 5] {
    let cuboid = |x: f32, y: f32, z: f32| ColliderShape::Cuboid {
        half_extents: Vec3::new(x, y, z),
    };
    [
        BodySpec::fixed(cuboid(4.0, 1.0, 10.0)).with_translation(Vec3::Y * FLOOR_CENTRE_Y),
        BodySpec::fixed(cuboid(1.0, 4.0, 10.0))
            .with_translation(Vec3::new(-SIDE_OFFSET_X, 0.0, 0.0))
            .with_rotation(Quat::from_rotation_z(-FRAC_PI_6)),
        BodySpec::fixed(cuboid(1.0, 4.0, 10.0))
            .with_translation(Vec3::new(SIDE_OFFSET_X, 0.0, 0.0))
            .with_rotation(Quat::from_rotation_z(FRAC_PI_6)),
        BodySpec::fixed(cuboid(4.0, 4.0, 1.0)).with_translation(Vec3::NEG_Z * PLATE_OFFSET_Z),
        BodySpec::fixed(cuboid(4.0, 4.0, 1.0)).with_translation(Vec3::Z * PLATE_OFFSET_Z),
    ]
}
