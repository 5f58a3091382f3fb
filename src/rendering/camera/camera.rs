use bevy::core_pipeline::post_process::ChromaticAberration;
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::core::config::CameraConfig;
use crate::scene::SceneDescription;

/// Bevy ambient brightness for an ambient intensity of 1.
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 500.0;
/// Post-process aberration intensity for a material aberration of 1.
pub const CHROMATIC_ABERRATION_SCALE: f32 = 0.1;

#[derive(Component, Debug)]
pub struct MainCamera;

/// Orthographic: `zoom` pixels per world unit. Perspective: vertical fov.
pub fn camera_projection(cfg: &CameraConfig) -> Projection {
    if cfg.orthographic {
        Projection::from(OrthographicProjection {
            scaling_mode: ScalingMode::WindowSize,
            scale: 1.0 / cfg.zoom.max(f32::EPSILON),
            ..OrthographicProjection::default_3d()
        })
    } else {
        Projection::from(PerspectiveProjection {
            fov: cfg.fov_degrees.to_radians(),
            ..default()
        })
    }
}

pub fn setup_camera(mut commands: Commands, description: Res<SceneDescription>) {
    let background = description.background().unwrap_or(Color::WHITE);
    commands.insert_resource(ClearColor(background));
    if let Some(intensity) = description.ambient_intensity() {
        commands.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: intensity.max(0.0) * AMBIENT_BRIGHTNESS_PER_UNIT,
            ..default()
        });
    }

    let cam_cfg = description.camera().cloned().unwrap_or_default();
    let aberration = description
        .surface_material()
        .map(|m| m.chromatic_aberration)
        .unwrap_or(0.0);
    let mut camera = commands.spawn((
        Name::new("Main Camera"),
        MainCamera,
        Camera3d::default(),
        Camera {
            hdr: true,
            clear_color: ClearColorConfig::Custom(background),
            ..default()
        },
        camera_projection(&cam_cfg),
        Transform::from_translation(Vec3::from_array(cam_cfg.position))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));
    if aberration > 0.0 {
        camera.insert(ChromaticAberration {
            intensity: aberration * CHROMATIC_ABERRATION_SCALE,
            ..default()
        });
    }
    info!(
        orthographic = cam_cfg.orthographic,
        zoom = cam_cfg.zoom,
        "main camera spawned"
    );
}
