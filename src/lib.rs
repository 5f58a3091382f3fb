pub mod app;
pub mod core;
pub mod debug;
pub mod field;
pub mod interaction;
pub mod physics;
pub mod rendering;
pub mod scene;
pub mod surface;

// Curated re-exports
pub use crate::app::game::{BlobScenePlugin, ConfigReport, SimulationPlugin};
pub use crate::core::components::{Blob, PhysicsBody, PointerBody, RngSeed, SurfaceVisual};
pub use crate::core::config::{SceneConfig, WindowConfig};
