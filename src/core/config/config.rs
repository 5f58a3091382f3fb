use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Blob Lamp".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub orthographic: bool,
    /// Pixels per world unit in orthographic mode.
    pub zoom: f32,
    /// Vertical field of view used when `orthographic` is false.
    pub fov_degrees: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            orthographic: true,
            zoom: 300.0,
            fov_degrees: 45.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Equirectangular HDR image, relative to the asset root. `None` = ambient light only.
    pub path: Option<String>,
    pub intensity: f32,
    /// Edge length in texels of each generated cubemap face.
    pub face_size: u32,
}
impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            path: Some("environment/industrial_workshop_foundry_1k.hdr".into()),
            intensity: 0.5,
            face_size: 256,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_intensity: f32,
    pub environment: EnvironmentConfig,
}
impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 1.0,
            environment: EnvironmentConfig::default(),
        }
    }
}

/// Physics stepping policy. Kept as a plain struct so layered RON merging can override it.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct TimestepConfig {
    /// `None` = one step per frame using the (capped) frame delta.
    /// `Some(hz)` = accumulate frame time and consume it in `1 / hz` increments.
    pub fixed_hz: Option<f32>,
    /// Upper bound on fixed steps per frame; leftover time is dropped.
    pub max_substeps: u32,
}
impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            fixed_hz: None,
            max_substeps: 4,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: [f32; 3],
    /// Upper bound applied to every frame delta before it reaches the solver.
    pub max_delta: f32,
    pub timestep: TimestepConfig,
    /// Static box colliders bounding the play volume.
    pub walls: bool,
}
impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -5.0, 0.0],
            max_delta: 0.1,
            timestep: TimestepConfig::default(),
            walls: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpawnRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for SpawnRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BlobSpawnConfig {
    pub count: usize,
    pub x_range: SpawnRange<f32>,
    pub y_range: SpawnRange<f32>,
    pub z: f32,
    /// Density contribution of a single blob.
    pub strength: f32,
    /// Per-blob kernel offset; together with `strength` it fixes the falloff radius.
    pub subtract: f32,
    /// sRGB colour written into the blended colour grid.
    pub color: [f32; 3],
    pub collider_radius: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Float blobs receive a small impulse back toward the origin every frame.
    pub float: bool,
    pub drift_strength: f32,
}
impl Default for BlobSpawnConfig {
    fn default() -> Self {
        Self {
            count: 10,
            x_range: SpawnRange { min: 0.0, max: 0.5 },
            y_range: SpawnRange { min: 0.0, max: 0.5 },
            z: 0.0,
            strength: 1.0,
            subtract: 6.0,
            color: [1.0, 1.0, 1.0],
            collider_radius: 0.1,
            restitution: 0.6,
            linear_damping: 4.0,
            angular_damping: 4.0,
            float: true,
            drift_strength: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    pub enabled: bool,
    pub collider_radius: f32,
}
impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collider_radius: 0.3,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Samples per axis of the density grid.
    pub resolution: usize,
    pub max_triangles: usize,
    pub isolation: f32,
    pub enable_colors: bool,
    pub enable_uvs: bool,
    /// The grid spans `[-half_extent, half_extent]` on every axis.
    pub half_extent: f32,
    /// Subtracted from every sample after accumulation.
    pub bias: f32,
    pub clamp_max: Option<f32>,
}
impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            resolution: 40,
            max_triangles: 10_000,
            isolation: 80.0,
            enable_colors: true,
            enable_uvs: false,
            half_extent: 1.0,
            bias: 0.0,
            clamp_max: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RenderTextureConfig {
    pub enabled: bool,
    pub size: u32,
    /// Linear clear colour of the offscreen pass (values above 1 are allowed).
    pub background: [f32; 3],
    pub prism_scale: f32,
    pub prism_position: [f32; 3],
}
impl RenderTextureConfig {
    /// Whether the offscreen pass runs and its image is bound as the
    /// transmission mask.
    pub fn is_active(&self) -> bool {
        self.enabled && self.size > 0
    }
}
impl Default for RenderTextureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 512,
            background: [2.0, 2.0, 2.0],
            prism_scale: 0.3,
            prism_position: [0.0, 0.0, -5.0],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TransmissionConfig {
    pub thickness: f32,
    pub roughness: f32,
    pub anisotropic_blur: f32,
    pub chromatic_aberration: f32,
    pub ior: f32,
    pub vertex_colors: bool,
    pub buffer: RenderTextureConfig,
}
impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            thickness: 0.4,
            roughness: 0.0,
            anisotropic_blur: 0.1,
            chromatic_aberration: 0.1,
            ior: 1.5,
            vertex_colors: true,
            buffer: RenderTextureConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    /// sRGB clear colour of the main view.
    pub background: [f32; 3],
    pub lighting: LightingConfig,
    pub physics: PhysicsConfig,
    pub blobs: BlobSpawnConfig,
    pub pointer: PointerConfig,
    pub surface: SurfaceConfig,
    pub material: TransmissionConfig,
    /// Fixed seed for blob placement. `None` = seed from entropy.
    pub seed: Option<u64>,
}
impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            camera: Default::default(),
            background: [1.0, 1.0, 1.0],
            lighting: Default::default(),
            physics: Default::default(),
            blobs: Default::default(),
            pointer: Default::default(),
            surface: Default::default(),
            material: Default::default(),
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Merge several RON files (later layers win field by field).
    /// Returns the config, the layers actually used and the problems met on the way.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                if let Some(val) = incoming.take() {
                                    merge_value(ev, val);
                                }
                                break;
                            }
                        }
                        if let Some(val) = incoming {
                            bm.insert(k, val);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<SceneConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (SceneConfig::default(), used, errors)
                }
            },
            None => (SceneConfig::default(), used, errors),
        }
    }

    /// Non-fatal sanity checks. Every entry is a human readable warning.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        } else if self.window.auto_close > 0.0 && self.window.auto_close < 0.01 {
            w.push(format!(
                "window.autoClose {} very small; closes almost immediately",
                self.window.auto_close
            ));
        }
        if self.camera.orthographic && self.camera.zoom <= 0.0 {
            w.push(format!("camera.zoom {} must be > 0", self.camera.zoom));
        }
        if !self.camera.orthographic && !(1.0..=170.0).contains(&self.camera.fov_degrees) {
            w.push(format!(
                "camera.fov_degrees {} outside 1..170",
                self.camera.fov_degrees
            ));
        }
        if self.lighting.ambient_intensity < 0.0 {
            w.push("lighting.ambient_intensity negative".into());
        }
        if self.lighting.environment.intensity < 0.0 {
            w.push("lighting.environment.intensity negative".into());
        }
        if self.lighting.environment.face_size == 0 {
            w.push("lighting.environment.face_size is 0; environment map disabled".into());
        }
        if self.physics.max_delta <= 0.0 {
            w.push(format!(
                "physics.max_delta {} must be > 0; physics will not advance",
                self.physics.max_delta
            ));
        } else if self.physics.max_delta > 0.5 {
            w.push(format!(
                "physics.max_delta {} very large; integration instability possible",
                self.physics.max_delta
            ));
        }
        if let Some(hz) = self.physics.timestep.fixed_hz {
            if hz <= 0.0 {
                w.push(format!("physics.timestep.fixed_hz {hz} must be > 0"));
            }
            if self.physics.timestep.max_substeps == 0 {
                w.push("physics.timestep max_substeps is 0; physics will not advance".into());
            }
        }
        if self.physics.gravity[1] > 0.0 {
            w.push(format!(
                "physics.gravity.y is positive ({}); typical configs use negative for downward",
                self.physics.gravity[1]
            ));
        }
        if self.blobs.count == 0 {
            w.push("blobs.count is 0; the surface will stay empty".into());
        }
        if self.blobs.count > 1_000 {
            w.push(format!(
                "blobs.count {} very high; field accumulation may suffer",
                self.blobs.count
            ));
        }
        fn check_range_f32(w: &mut Vec<String>, label: &str, r: &SpawnRange<f32>) {
            if r.min > r.max {
                w.push(format!("{label} min ({}) greater than max ({})", r.min, r.max));
            }
        }
        check_range_f32(&mut w, "blobs.x_range", &self.blobs.x_range);
        check_range_f32(&mut w, "blobs.y_range", &self.blobs.y_range);
        if self.blobs.subtract <= 0.0 {
            w.push(format!(
                "blobs.subtract {} must be > 0 (kernel would never fall off)",
                self.blobs.subtract
            ));
        }
        if self.blobs.collider_radius <= 0.0 {
            w.push("blobs.collider_radius must be > 0".into());
        }
        if !(0.0..=1.5).contains(&self.blobs.restitution) {
            w.push(format!(
                "blobs.restitution {} outside recommended 0..1.5",
                self.blobs.restitution
            ));
        }
        if self.blobs.linear_damping < 0.0 || self.blobs.angular_damping < 0.0 {
            w.push("blobs damping negative -> energy gain".into());
        }
        if self.pointer.enabled && self.pointer.collider_radius <= 0.0 {
            w.push("pointer.collider_radius must be > 0".into());
        }
        if self.surface.resolution < 2 {
            w.push(format!(
                "surface.resolution {} < 2; surface will be empty",
                self.surface.resolution
            ));
        } else if self.surface.resolution > 128 {
            w.push(format!(
                "surface.resolution {} very high; extraction cost grows cubically",
                self.surface.resolution
            ));
        }
        if self.surface.max_triangles == 0 {
            w.push("surface.max_triangles is 0; surface will be empty".into());
        }
        if self.surface.half_extent <= 0.0 {
            w.push("surface.half_extent must be > 0".into());
        }
        if let Some(max) = self.surface.clamp_max {
            if max <= self.surface.isolation {
                w.push(format!(
                    "surface.clamp_max {max} <= isolation {}; nothing can cross the iso level",
                    self.surface.isolation
                ));
            }
        }
        if self.material.thickness < 0.0 {
            w.push("material.thickness negative".into());
        }
        if !(0.0..=1.0).contains(&self.material.roughness) {
            w.push(format!(
                "material.roughness {} outside 0..1",
                self.material.roughness
            ));
        }
        if self.material.ior < 1.0 {
            w.push(format!("material.ior {} below 1.0", self.material.ior));
        }
        if self.material.buffer.enabled && self.material.buffer.size == 0 {
            w.push("material.buffer.size is 0; render texture disabled".into());
        }
        w
    }
}
