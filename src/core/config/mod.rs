pub mod config;

pub use config::{
    BlobSpawnConfig, CameraConfig, EnvironmentConfig, LightingConfig, PhysicsConfig,
    PointerConfig, RenderTextureConfig, SceneConfig, SpawnRange, SurfaceConfig, TimestepConfig,
    TransmissionConfig, WindowConfig,
};
