#[cfg(feature = "debug")]
use super::stats::DebugStats;
#[cfg(feature = "debug")]
use bevy::prelude::*;

#[cfg(feature = "debug")]
pub fn debug_logging_system(time: Res<Time>, mut stats: ResMut<DebugStats>) {
    stats.time_accum += time.delta_secs();
    if stats.time_accum >= stats.log_interval {
        stats.time_accum = 0.0;
        info!(
            "SIM frame={} t={:.3}s fps={:.1} ft_ms={:.1} blobs={} tris={} verts={} trunc={} substeps={}",
            stats.frame_counter,
            time.elapsed_secs(),
            stats.fps,
            stats.frame_time_ms,
            stats.blob_count,
            stats.triangles,
            stats.vertices,
            stats.truncated,
            stats.physics_substeps,
        );
    }
}
