// This file is part of Blob Lamp.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

use bevy::prelude::*;

use crate::core::config::SceneConfig;
use crate::core::system::system_order::FrameOrderPlugin;
#[cfg(feature = "debug")]
use crate::debug::DebugPlugin;
use crate::field::FieldPlugin;
use crate::interaction::pointer::PointerPlugin;
use crate::interaction::session::auto_close::AutoClosePlugin;
use crate::physics::PhysicsPlugin;
use crate::rendering::RenderingPlugin;
use crate::scene::ScenePlugin;
use crate::surface::SurfacePlugin;

/// Problems met while loading the config, replayed once logging is up.
#[derive(Resource, Debug, Default, Clone)]
pub struct ConfigReport {
    pub layers: Vec<String>,
    pub load_errors: Vec<String>,
}

/// Everything that runs without a GPU: scene setup and the per-frame
/// input -> physics -> field -> extract chain.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConfigReport>()
            .add_plugins((
                FrameOrderPlugin,
                ScenePlugin,
                PointerPlugin,
                PhysicsPlugin,
                FieldPlugin,
                SurfacePlugin,
                AutoClosePlugin,
            ))
            .add_systems(PreStartup, log_config_summary);
    }
}

/// Full interactive scene: simulation plus rendering and debug stats.
pub struct BlobScenePlugin;

impl Plugin for BlobScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((SimulationPlugin, RenderingPlugin));
        #[cfg(feature = "debug")]
        app.add_plugins(DebugPlugin);
    }
}

fn log_config_summary(cfg: Res<SceneConfig>, report: Res<ConfigReport>) {
    for e in &report.load_errors {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    if report.layers.is_empty() {
        info!("No config layers found; using defaults");
    } else {
        info!(layers = ?report.layers, "Config layers loaded");
    }
    for w in cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    info!(
        blobs = cfg.blobs.count,
        resolution = cfg.surface.resolution,
        max_triangles = cfg.surface.max_triangles,
        isolation = cfg.surface.isolation,
        walls = cfg.physics.walls,
        pointer = cfg.pointer.enabled,
        "scene config"
    );
}
