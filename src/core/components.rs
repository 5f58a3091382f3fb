use bevy::prelude::*;

use crate::physics::world::BodyHandle;

/// Marker for a blob entity. The physics world owns its transform; the
/// entity only mirrors it for inspection and carries the field parameters.
#[derive(Component, Debug, Clone, Copy)]
pub struct Blob {
    pub strength: f32,
    pub subtract: f32,
    /// Linear RGB.
    pub color: Vec3,
    /// Receives the per-frame restoring impulse toward the origin.
    pub float: bool,
}

/// Rigid body backing an entity inside the [`crate::physics::world::PhysicsWorld`].
#[derive(Component, Debug, Deref, Copy, Clone, PartialEq, Eq)]
pub struct PhysicsBody(pub BodyHandle);

/// Kinematic body driven by the cursor.
#[derive(Component, Debug)]
pub struct PointerBody;

/// The single entity displaying the extracted isosurface.
#[derive(Component, Debug)]
pub struct SurfaceVisual;

/// Deterministic RNG seed resource (set once at startup / tests for reproducible placement).
#[derive(Resource, Debug, Copy, Clone, Default)]
pub struct RngSeed(pub u64);
