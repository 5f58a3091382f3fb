use bevy::asset::AssetLoadFailedEvent;
use bevy::prelude::*;

use super::cubemap::equirect_to_cubemap;
use crate::rendering::camera::MainCamera;
use crate::scene::SceneDescription;

/// Bevy environment-map intensity for a scene intensity of 1.
pub const ENVIRONMENT_INTENSITY_SCALE: f32 = 1000.0;

#[derive(Resource, Debug, Clone, PartialEq)]
pub enum EnvironmentState {
    /// Waiting for the panorama; the scene is lit by ambient light only.
    Loading {
        source: Handle<Image>,
        intensity: f32,
        face_size: u32,
    },
    Ready(Handle<Image>),
    /// Ambient light only for the rest of the session.
    Unavailable,
}

pub fn request_environment(
    mut commands: Commands,
    description: Res<SceneDescription>,
    asset_server: Res<AssetServer>,
) {
    let state = match description.environment() {
        Some(env) => {
            info!(path = %env.path, "loading environment map");
            EnvironmentState::Loading {
                source: asset_server.load(env.path.clone()),
                intensity: env.intensity,
                face_size: env.face_size,
            }
        }
        None => EnvironmentState::Unavailable,
    };
    commands.insert_resource(state);
}

pub fn bind_environment_when_loaded(
    mut commands: Commands,
    state: Option<ResMut<EnvironmentState>>,
    mut images: ResMut<Assets<Image>>,
    mut failures: EventReader<AssetLoadFailedEvent<Image>>,
    q_camera: Query<Entity, With<MainCamera>>,
) {
    let Some(mut state) = state else { return };
    let EnvironmentState::Loading {
        source,
        intensity,
        face_size,
    } = &*state
    else {
        failures.clear();
        return;
    };

    if let Some(failure) = failures.read().find(|e| e.id == source.id()) {
        warn!(
            path = %failure.path,
            "environment map failed to load ({}); continuing with ambient light only",
            failure.error
        );
        *state = EnvironmentState::Unavailable;
        return;
    }
    let Some(panorama) = images.get(source) else {
        return;
    };

    let (intensity, face_size) = (*intensity, *face_size);
    let cubemap = match equirect_to_cubemap(panorama, face_size) {
        Ok(image) => images.add(image),
        Err(e) => {
            warn!("environment map unusable: {e:#}; continuing with ambient light only");
            *state = EnvironmentState::Unavailable;
            return;
        }
    };
    for camera in &q_camera {
        commands.entity(camera).insert(EnvironmentMapLight {
            diffuse_map: cubemap.clone(),
            specular_map: cubemap.clone(),
            intensity: intensity * ENVIRONMENT_INTENSITY_SCALE,
            ..default()
        });
    }
    info!(face_size, "environment map bound");
    *state = EnvironmentState::Ready(cubemap);
}
