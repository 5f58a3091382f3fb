//! Offscreen pass feeding the surface material: a bright backdrop with a
//! black triangular prism, drawn by a second camera on its own render layer.
use std::f32::consts::FRAC_PI_2;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat, TextureUsages};
use bevy::render::view::RenderLayers;

use crate::core::config::RenderTextureConfig;
use crate::scene::SceneDescription;

pub const BUFFER_LAYER: usize = 1;
const BUFFER_CAMERA_FOV_DEGREES: f32 = 75.0;

/// Image the offscreen camera renders into; bound as the transmission mask.
#[derive(Resource, Debug, Clone)]
pub struct TransmissionBuffer {
    pub image: Handle<Image>,
}

pub fn buffer_image(size: u32) -> Image {
    let extent = Extent3d {
        width: size,
        height: size,
        depth_or_array_layers: 1,
    };
    let mut image = Image::new_fill(
        extent,
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Bgra8UnormSrgb,
        RenderAssetUsages::default(),
    );
    image.texture_descriptor.usage =
        TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST | TextureUsages::RENDER_ATTACHMENT;
    image
}

pub fn prism_transform(cfg: &RenderTextureConfig) -> Transform {
    Transform::from_translation(Vec3::from_array(cfg.prism_position))
        .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
        .with_scale(Vec3::splat(cfg.prism_scale))
}

pub fn setup_render_texture(
    mut commands: Commands,
    description: Res<SceneDescription>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(cfg) = description.surface_material().map(|m| &m.buffer) else {
        return;
    };
    if !cfg.is_active() {
        return;
    }
    let image = images.add(buffer_image(cfg.size));
    let layer = RenderLayers::layer(BUFFER_LAYER);
    let [r, g, b] = cfg.background;

    commands.spawn((
        Name::new("Transmission Buffer Camera"),
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(image.clone().into()),
            order: -1,
            clear_color: ClearColorConfig::Custom(Color::linear_rgb(r, g, b)),
            ..default()
        },
        Projection::from(PerspectiveProjection {
            fov: BUFFER_CAMERA_FOV_DEGREES.to_radians(),
            aspect_ratio: 1.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        layer.clone(),
    ));

    // Three-sided cylinder: a triangular prism seen end on.
    let prism = meshes.add(Cylinder::new(1.0, 1.0).mesh().resolution(3));
    let black = materials.add(StandardMaterial {
        base_color: Color::BLACK,
        unlit: true,
        ..default()
    });
    commands.spawn((
        Name::new("Transmission Prism"),
        Mesh3d(prism),
        MeshMaterial3d(black),
        prism_transform(cfg),
        layer,
    ));

    debug!(size = cfg.size, "transmission buffer ready");
    commands.insert_resource(TransmissionBuffer { image });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_is_a_square_render_target() {
        let image = buffer_image(512);
        assert_eq!(image.width(), 512);
        assert_eq!(image.height(), 512);
        assert!(image
            .texture_descriptor
            .usage
            .contains(TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING));
    }

    #[test]
    fn prism_faces_the_buffer_camera() {
        let t = prism_transform(&RenderTextureConfig::default());
        assert_eq!(t.translation, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(t.scale, Vec3::splat(0.3));
        // The cylinder axis (local Y) ends up along the view direction.
        let axis = t.rotation * Vec3::Y;
        assert!(axis.z.abs() > 0.999, "{axis}");
    }
}
