use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

use blob_lamp::{BlobScenePlugin, ConfigReport, RngSeed, SceneConfig};

/// Metaball lamp: physics-driven blobs rendered as a glassy isosurface.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config layers, merged in order (later files win field by field)
    #[arg(short, long = "config", value_name = "PATH")]
    configs: Vec<PathBuf>,

    /// Fixed seed for blob placement
    #[arg(long)]
    seed: Option<u64>,

    /// Exit after this many seconds
    #[arg(long, value_name = "SECONDS")]
    auto_close: Option<f32>,
}

#[cfg(target_arch = "wasm32")]
fn load_config(_args: &Args) -> (SceneConfig, ConfigReport) {
    const RAW: &str = include_str!("../assets/config/scene.ron");
    match ron::from_str(RAW) {
        Ok(cfg) => (
            cfg,
            ConfigReport {
                layers: vec!["<embedded scene.ron>".into()],
                ..default()
            },
        ),
        Err(e) => (
            SceneConfig::default(),
            ConfigReport {
                load_errors: vec![format!("embedded scene.ron: parse error: {e}")],
                ..default()
            },
        ),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(args: &Args) -> (SceneConfig, ConfigReport) {
    let paths = if args.configs.is_empty() {
        vec![
            PathBuf::from("assets/config/scene.ron"),
            PathBuf::from("assets/config/scene.local.ron"),
        ]
    } else {
        args.configs.clone()
    };
    let (cfg, layers, load_errors) = SceneConfig::load_layered(&paths);
    (cfg, ConfigReport { layers, load_errors })
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    let args = Args::parse();
    let (mut cfg, report) = load_config(&args);
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    if let Some(secs) = args.auto_close {
        cfg.window.auto_close = secs;
    }

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: cfg.window.title.clone(),
            resolution: (cfg.window.width, cfg.window.height).into(),
            resizable: true,
            ..default()
        }),
        ..default()
    }));
    if let Some(seed) = cfg.seed {
        app.insert_resource(RngSeed(seed));
    }
    app.insert_resource(report)
        .insert_resource(cfg)
        .add_plugins(BlobScenePlugin)
        .run();
}
