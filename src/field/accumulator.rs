//! Scalar density field sampled on a cubic grid, plus a parallel colour grid.
//!
//! Every blob contributes `strength / (d² + ε) - subtract` wherever that is
//! positive, with `d` measured in normalised grid space (`[0, 1]` per axis).
//! The outer layer of samples never receives contributions so the extracted
//! surface stays closed at the domain boundary.
use bevy::prelude::*;

/// Keeps the kernel finite exactly at a blob centre.
const KERNEL_EPSILON: f32 = 1e-6;

/// Read-only snapshot of one blob as seen by the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metaball {
    /// World space.
    pub position: Vec3,
    /// Negative strength carves the field instead of adding to it.
    pub strength: f32,
    pub subtract: f32,
    /// Linear RGB.
    pub color: Vec3,
}

impl Metaball {
    /// Distance (normalised grid units) at which the kernel reaches zero.
    pub fn falloff_radius(&self) -> f32 {
        if self.subtract <= 0.0 {
            return f32::INFINITY;
        }
        (self.strength.abs() / self.subtract).sqrt()
    }

    /// Distance (normalised grid units) at which the kernel alone equals `iso`.
    pub fn iso_radius(&self, iso: f32) -> f32 {
        let denom = iso + self.subtract;
        if denom <= 0.0 {
            return f32::INFINITY;
        }
        (self.strength.abs() / denom - KERNEL_EPSILON).max(0.0).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSettings {
    /// Samples per axis.
    pub resolution: usize,
    pub half_extent: f32,
    pub bias: f32,
    pub clamp_max: Option<f32>,
    pub colors: bool,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            resolution: 40,
            half_extent: 1.0,
            bias: 0.0,
            clamp_max: None,
            colors: true,
        }
    }
}

/// `n³` samples laid out x-fastest, then y, then z.
#[derive(Debug, Clone, Default)]
pub struct DensityGrid {
    n: usize,
    values: Vec<f32>,
    color_sums: Vec<Vec3>,
    weights: Vec<f32>,
}

impl DensityGrid {
    pub fn new(n: usize, colors: bool) -> Self {
        let len = n * n * n;
        Self {
            n,
            values: vec![0.0; len],
            color_sums: if colors { vec![Vec3::ZERO; len] } else { Vec::new() },
            weights: if colors { vec![0.0; len] } else { Vec::new() },
        }
    }

    pub fn resolution(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.n * (y + self.n * z)
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.index(x, y, z)]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn has_colors(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Weighted average of contributing blob colours; white where nothing contributed.
    pub fn color(&self, x: usize, y: usize, z: usize) -> Vec3 {
        if !self.has_colors() {
            return Vec3::ONE;
        }
        let i = self.index(x, y, z);
        let w = self.weights[i];
        if w > 0.0 {
            self.color_sums[i] / w
        } else {
            Vec3::ONE
        }
    }

    /// Central-difference gradient in index space (one-sided at the borders).
    pub fn gradient(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let last = self.n.saturating_sub(1);
        let (x0, x1) = (x.saturating_sub(1), (x + 1).min(last));
        let (y0, y1) = (y.saturating_sub(1), (y + 1).min(last));
        let (z0, z1) = (z.saturating_sub(1), (z + 1).min(last));
        Vec3::new(
            self.value(x1, y, z) - self.value(x0, y, z),
            self.value(x, y1, z) - self.value(x, y0, z),
            self.value(x, y, z1) - self.value(x, y, z0),
        )
    }

    fn reset(&mut self, fill: f32) {
        self.values.fill(fill);
        self.color_sums.fill(Vec3::ZERO);
        self.weights.fill(0.0);
    }
}

/// Owns the density grid and the per-frame blob scratch buffer; both are reused in place.
#[derive(Resource, Debug, Clone)]
pub struct FieldAccumulator {
    settings: FieldSettings,
    grid: DensityGrid,
    scratch: Vec<Metaball>,
}

impl FieldAccumulator {
    pub fn new(settings: FieldSettings) -> Self {
        Self {
            grid: DensityGrid::new(settings.resolution, settings.colors),
            settings,
            scratch: Vec::new(),
        }
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn grid(&self) -> &DensityGrid {
        &self.grid
    }

    #[inline]
    pub fn sample(&self, x: usize, y: usize, z: usize) -> f32 {
        self.grid.value(x, y, z)
    }

    /// Blobs used by the last accumulation.
    pub fn blobs(&self) -> &[Metaball] {
        &self.scratch
    }

    /// World position -> normalised grid coordinates (`[0, 1]` inside the domain).
    pub fn world_to_grid(&self, p: Vec3) -> Vec3 {
        let h = self.settings.half_extent;
        (p + Vec3::splat(h)) / (2.0 * h)
    }

    /// World position of grid sample `(x, y, z)`.
    pub fn grid_to_world(&self, x: usize, y: usize, z: usize) -> Vec3 {
        let n = self.grid.n;
        if n < 2 {
            return Vec3::ZERO;
        }
        let h = self.settings.half_extent;
        let step = 2.0 * h / (n - 1) as f32;
        Vec3::new(x as f32, y as f32, z as f32) * step - Vec3::splat(h)
    }

    /// Replace the scratch snapshot and recompute the grid from it.
    pub fn refresh<I>(&mut self, blobs: I)
    where
        I: IntoIterator<Item = Metaball>,
    {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(blobs);
        self.accumulate(&scratch);
        self.scratch = scratch;
    }

    /// Recompute every sample: `Σ kernel - bias`, optionally clamped from above.
    pub fn accumulate(&mut self, blobs: &[Metaball]) {
        self.grid.reset(-self.settings.bias);
        for blob in blobs {
            self.add_metaball(blob);
        }
        if let Some(max) = self.settings.clamp_max {
            for v in &mut self.grid.values {
                *v = v.min(max);
            }
        }
    }

    fn add_metaball(&mut self, blob: &Metaball) {
        let n = self.grid.n;
        if n < 3 || blob.strength == 0.0 {
            return;
        }
        let sign = blob.strength.signum();
        let strength = blob.strength.abs();
        let radius = blob.falloff_radius();
        let scale = (n - 1) as f32;
        let center = self.world_to_grid(blob.position);
        let colors = self.grid.has_colors();

        // Index-space bounds, skipping the outer layer.
        let lo = |c: f32| ((c - radius) * scale).floor().max(1.0) as usize;
        let hi = |c: f32| ((c + radius) * scale).ceil().min((n - 2) as f32) as isize;
        let (x0, x1) = (lo(center.x), hi(center.x));
        let (y0, y1) = (lo(center.y), hi(center.y));
        let (z0, z1) = (lo(center.z), hi(center.z));
        if x1 < x0 as isize || y1 < y0 as isize || z1 < z0 as isize {
            return;
        }

        for z in z0..=z1 as usize {
            let fz = z as f32 / scale - center.z;
            for y in y0..=y1 as usize {
                let fy = y as f32 / scale - center.y;
                let fyz = fy * fy + fz * fz;
                for x in x0..=x1 as usize {
                    let fx = x as f32 / scale - center.x;
                    let d2 = fx * fx + fyz;
                    let val = strength / (KERNEL_EPSILON + d2) - blob.subtract;
                    if val <= 0.0 {
                        continue;
                    }
                    let i = self.grid.index(x, y, z);
                    self.grid.values[i] += val * sign;
                    if colors {
                        let w = blend_weight(d2.sqrt(), radius);
                        self.grid.color_sums[i] += blob.color * w;
                        self.grid.weights[i] += w;
                    }
                }
            }
        }
    }
}

/// `1 - smootherstep(d / radius)`: 1 at the centre, 0 at the falloff radius.
fn blend_weight(d: f32, radius: f32) -> f32 {
    if !radius.is_finite() {
        return 1.0;
    }
    let t = (d / radius).clamp(0.0, 1.0);
    1.0 - t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}
