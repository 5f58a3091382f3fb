#[cfg(feature = "debug")]
use crate::core::components::Blob;
#[cfg(feature = "debug")]
use crate::physics::PhysicsWorld;
#[cfg(feature = "debug")]
use crate::surface::SurfaceExtractor;
#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
#[derive(Resource, Debug)]
pub struct DebugStats {
    pub frame_counter: u64,
    pub fps: f32,
    pub frame_time_ms: f32,
    pub blob_count: usize,
    pub triangles: usize,
    pub vertices: usize,
    pub truncated: bool,
    pub physics_substeps: u32,
    pub time_accum: f32,
    pub log_interval: f32,
}

#[cfg(feature = "debug")]
impl Default for DebugStats {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            fps: 0.0,
            frame_time_ms: 0.0,
            blob_count: 0,
            triangles: 0,
            vertices: 0,
            truncated: false,
            physics_substeps: 0,
            time_accum: 0.0,
            log_interval: 1.0,
        }
    }
}

#[cfg(feature = "debug")]
pub fn debug_stats_collect_system(
    time: Res<Time>,
    mut stats: ResMut<DebugStats>,
    q_blobs: Query<&Blob>,
    extractor: Option<Res<SurfaceExtractor>>,
    world: Option<Res<PhysicsWorld>>,
) {
    stats.frame_counter += 1;
    let dt = time.delta_secs().max(1e-6);
    let inst_fps = 1.0 / dt;
    if stats.fps == 0.0 {
        stats.fps = inst_fps;
    } else {
        stats.fps = stats.fps * 0.9 + inst_fps * 0.1;
    }
    let inst_ms = dt * 1000.0;
    if stats.frame_time_ms == 0.0 {
        stats.frame_time_ms = inst_ms;
    } else {
        stats.frame_time_ms = stats.frame_time_ms * 0.9 + inst_ms * 0.1;
    }
    stats.blob_count = q_blobs.iter().count();
    if let Some(extractor) = extractor {
        stats.triangles = extractor.mesh().triangle_count();
        stats.vertices = extractor.mesh().vertex_count();
        stats.truncated = extractor.truncated();
    }
    stats.physics_substeps = world.map_or(0, |w| w.last_substeps());
}
