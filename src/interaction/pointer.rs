use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::core::components::{PhysicsBody, PointerBody};
use crate::core::config::{CameraConfig, SceneConfig};
use crate::core::system::system_order::FrameSet;
use crate::physics::PhysicsWorld;

/// Last known pointer position in normalised device coordinates. Stays put
/// while the cursor is outside the window.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub ndc: Vec2,
}

pub struct PointerPlugin;

impl Plugin for PointerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Update, track_pointer.in_set(FrameSet::Input));
    }
}

/// Window position (logical pixels, origin top-left, y down) to NDC in `[-1, 1]`, y up.
pub fn cursor_to_ndc(cursor: Vec2, window_size: Vec2) -> Option<Vec2> {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / window_size.x * 2.0 - 1.0,
        1.0 - cursor.y / window_size.y * 2.0,
    ))
}

/// Size of the visible region on the `z = 0` plane, in world units.
pub fn viewport_world_size(camera: &CameraConfig, window_size: Vec2) -> Vec2 {
    if camera.orthographic {
        if camera.zoom <= 0.0 {
            return Vec2::ZERO;
        }
        window_size / camera.zoom
    } else {
        let distance = Vec3::from_array(camera.position).length();
        let height = 2.0 * distance * (camera.fov_degrees.to_radians() * 0.5).tan();
        let aspect = if window_size.y > 0.0 {
            window_size.x / window_size.y
        } else {
            1.0
        };
        Vec2::new(height * aspect, height)
    }
}

pub fn pointer_world(ndc: Vec2, viewport: Vec2) -> Vec3 {
    (ndc * viewport * 0.5).extend(0.0)
}

/// Project the cursor into the scene and hand it to the kinematic pointer body.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    cfg: Res<SceneConfig>,
    mut pointer: ResMut<PointerState>,
    world: Option<ResMut<PhysicsWorld>>,
    q_pointer: Query<&PhysicsBody, With<PointerBody>>,
) {
    let window_size = match windows.single() {
        Ok(window) => {
            let size = window.size();
            if let Some(ndc) = window
                .cursor_position()
                .and_then(|cursor| cursor_to_ndc(cursor, size))
            {
                pointer.ndc = ndc;
            }
            size
        }
        Err(_) => Vec2::new(cfg.window.width, cfg.window.height),
    };
    let Some(mut world) = world else { return };
    let target = pointer_world(pointer.ndc, viewport_world_size(&cfg.camera, window_size));
    for body in &q_pointer {
        world.set_kinematic_target(**body, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_and_centre() {
        let size = Vec2::new(1280.0, 720.0);
        assert_eq!(cursor_to_ndc(Vec2::ZERO, size), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(cursor_to_ndc(size, size), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(cursor_to_ndc(size * 0.5, size), Some(Vec2::ZERO));
        assert_eq!(cursor_to_ndc(Vec2::ONE, Vec2::ZERO), None);
    }

    #[test]
    fn orthographic_viewport_is_window_over_zoom() {
        let cam = CameraConfig::default();
        let v = viewport_world_size(&cam, Vec2::new(1200.0, 600.0));
        assert_eq!(v, Vec2::new(4.0, 2.0));
        // Right edge of the window lands half a viewport from the origin.
        assert_eq!(pointer_world(Vec2::new(1.0, 0.0), v), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(pointer_world(Vec2::new(-0.5, 1.0), v), Vec3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn perspective_viewport_uses_fov_at_origin_plane() {
        let cam = CameraConfig {
            orthographic: false,
            fov_degrees: 90.0,
            position: [0.0, 0.0, 5.0],
            ..default()
        };
        let v = viewport_world_size(&cam, Vec2::new(200.0, 100.0));
        assert!((v.y - 10.0).abs() < 1e-4, "{v}");
        assert!((v.x - 20.0).abs() < 1e-4, "{v}");
    }

    #[test]
    fn pointer_moves_kinematic_body_without_window() {
        use crate::physics::{BodySpec, ColliderShape, PhysicsSettings};

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins((
            crate::core::system::system_order::FrameOrderPlugin,
            PointerPlugin,
        ));
        app.insert_resource(SceneConfig::default());
        let mut world = PhysicsWorld::new(PhysicsSettings::default());
        let handle = world.add_body(
            &BodySpec::kinematic(ColliderShape::Sphere { radius: 0.3 })
                .with_translation(Vec3::new(1.0, 1.0, 0.0)),
        );
        // Pretend the cursor has already been seen in the top-right quadrant.
        app.insert_resource(PointerState {
            ndc: Vec2::new(0.5, 0.5),
        });
        app.world_mut().spawn((PointerBody, PhysicsBody(handle)));
        world.step(1.0 / 60.0);
        app.insert_resource(world);
        app.update();
        let mut world = app.world_mut().resource_mut::<PhysicsWorld>();
        world.step(1.0 / 60.0);
        // 1280x720 at zoom 300 -> viewport 4.2667 x 2.4.
        let p = world.translation(handle).unwrap();
        assert!((p.x - 1280.0 / 300.0 * 0.25).abs() < 1e-5, "{p}");
        assert!((p.y - 720.0 / 300.0 * 0.25).abs() < 1e-5, "{p}");
        assert_eq!(p.z, 0.0);
    }
}
