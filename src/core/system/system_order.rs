//! Central system ordering labels to make the per-frame sequence explicit.
//! Stages (chained in this order every `Update`):
//! 1. Input (pointer projection -> kinematic target)
//! 2. Physics (float drift impulses, then one capped world step)
//! 3. Field (blob snapshot -> density grid)
//! 4. Extract (density grid -> surface mesh buffer)
//! 5. Render (mesh buffer -> GPU mesh asset)
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum FrameSet {
    Input,
    Physics,
    Field,
    Extract,
    Render,
}

/// Startup phases. The scene description is instantiated before anything
/// that needs the physics world or the field resources.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum SetupSet {
    /// Scene description, physics world, blob and pointer entities.
    Scene,
    /// Camera, lights, environment, render texture and surface visual.
    Render,
}

/// Registers the chain once; every stage plugin only inserts into its own set.
pub struct FrameOrderPlugin;

impl Plugin for FrameOrderPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Startup, (SetupSet::Scene, SetupSet::Render).chain());
        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Physics,
                FrameSet::Field,
                FrameSet::Extract,
                FrameSet::Render,
            )
                .chain(),
        );
    }
}
