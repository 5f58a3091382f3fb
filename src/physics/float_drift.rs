use bevy::prelude::*;

/// Default drift strength for float blobs.
pub const DEFAULT_DRIFT_STRENGTH: f32 = 0.2;

/// Restoring impulse for a float blob at `position`: points at the origin
/// and grows linearly with the capped frame delta. Zero at the origin.
#[inline]
pub fn float_drift_impulse(position: Vec3, capped_delta: f32, strength: f32) -> Vec3 {
    position.normalize_or_zero() * (capped_delta * -strength)
}

/// Strength shared by every float blob.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FloatDrift {
    pub strength: f32,
}

impl Default for FloatDrift {
    fn default() -> Self {
        Self {
            strength: DEFAULT_DRIFT_STRENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_toward_origin() {
        let p = Vec3::new(0.3, 0.4, 0.0);
        let i = float_drift_impulse(p, 1.0 / 60.0, DEFAULT_DRIFT_STRENGTH);
        assert!(i.dot(p) < 0.0);
        assert!(i.normalize().dot(-p.normalize()) > 0.9999);
        assert!((i.length() - DEFAULT_DRIFT_STRENGTH / 60.0).abs() < 1e-6);
    }

    #[test]
    fn scales_linearly_with_delta() {
        let p = Vec3::new(-0.2, 0.1, 0.05);
        let a = float_drift_impulse(p, 0.01, 0.2);
        let b = float_drift_impulse(p, 0.03, 0.2);
        assert!((b - a * 3.0).length() < 1e-6);
    }

    #[test]
    fn independent_of_distance() {
        let near = float_drift_impulse(Vec3::X * 0.01, 0.1, 0.2);
        let far = float_drift_impulse(Vec3::X * 3.0, 0.1, 0.2);
        assert!((near - far).length() < 1e-6);
    }

    #[test]
    fn zero_at_origin() {
        assert_eq!(float_drift_impulse(Vec3::ZERO, 0.1, 0.2), Vec3::ZERO);
    }
}
