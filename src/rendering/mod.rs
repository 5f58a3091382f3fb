//! Presentation side of the scene. Everything here only reads simulation
//! state; the surface mesh is the sole per-frame upload.
pub mod camera;
pub mod environment;
pub mod isosurface;
pub mod materials;
pub mod render_texture;

use bevy::prelude::*;

use crate::core::system::system_order::{FrameSet, SetupSet};

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                camera::setup_camera,
                render_texture::setup_render_texture,
                isosurface::spawn_surface_visual,
                environment::request_environment,
            )
                .chain()
                .in_set(SetupSet::Render),
        )
        .add_systems(
            Update,
            (
                isosurface::upload_surface_mesh.in_set(FrameSet::Render),
                environment::bind_environment_when_loaded,
            ),
        );
    }
}
