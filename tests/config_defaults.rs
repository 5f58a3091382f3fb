use std::path::Path;

use blob_lamp::core::config::SceneConfig;

fn shipped_config() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config/scene.ron")
}

#[test]
fn shipped_config_matches_defaults() {
    let cfg = SceneConfig::load_from_file(shipped_config()).expect("scene.ron parses");
    assert_eq!(cfg, SceneConfig::default());
    assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
}

#[test]
fn shipped_config_survives_layered_merge() {
    let mut local = std::env::temp_dir();
    local.push("blob_lamp_scene.local.ron");
    std::fs::write(&local, "(blobs: (count: 3), surface: (clamp_max: Some(500.0)))").unwrap();

    let (cfg, used, errors) = SceneConfig::load_layered([shipped_config(), local.clone()]);
    let _ = std::fs::remove_file(&local);
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(used.len(), 2);
    assert_eq!(cfg.blobs.count, 3);
    assert_eq!(cfg.surface.clamp_max, Some(500.0));
    assert_eq!(cfg.surface.resolution, 40);
    assert_eq!(cfg.lighting.environment.intensity, 0.5);
}
