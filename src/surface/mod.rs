pub mod marching_cubes;
pub mod tables;

pub use marching_cubes::{ExtractSettings, SurfaceExtractor, SurfaceMesh};

use bevy::prelude::*;

use crate::core::system::system_order::FrameSet;
use crate::field::FieldAccumulator;

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, extract_surface.in_set(FrameSet::Extract));
    }
}

pub fn extract_surface(
    field: Option<Res<FieldAccumulator>>,
    extractor: Option<ResMut<SurfaceExtractor>>,
) {
    let (Some(field), Some(mut extractor)) = (field, extractor) else {
        return;
    };
    let truncated_before = extractor.truncated();
    extractor.extract(&field);
    if extractor.truncated() && !truncated_before {
        debug!(
            max_triangles = extractor.settings().max_triangles,
            "surface hit its triangle budget; remaining cells skipped"
        );
    }
}
