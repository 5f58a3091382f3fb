use bevy::prelude::*;

use crate::core::config::TransmissionConfig;

/// Glass-like material for the isosurface. Vertex colours (when the mesh
/// carries them) tint the white base colour in the PBR shader.
///
/// The PBR transmission pass blurs what it sees through the surface by
/// perceptual roughness, so `anisotropic_blur` is added on top of the
/// configured roughness.
pub fn transmission_material(
    cfg: &TransmissionConfig,
    transmission_mask: Option<Handle<Image>>,
) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        specular_transmission: 1.0,
        specular_transmission_texture: transmission_mask,
        thickness: cfg.thickness.max(0.0),
        ior: cfg.ior.max(1.0),
        perceptual_roughness: (cfg.roughness.max(0.0) + cfg.anisotropic_blur.max(0.0)).min(1.0),
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_clear_glass() {
        let m = transmission_material(&TransmissionConfig::default(), None);
        assert_eq!(m.specular_transmission, 1.0);
        assert!((m.thickness - 0.4).abs() < 1e-6);
        // Roughness 0 plus the default blur of 0.1.
        assert!((m.perceptual_roughness - 0.1).abs() < 1e-6);
        assert!((m.ior - 1.5).abs() < 1e-6);
        assert!(m.specular_transmission_texture.is_none());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = TransmissionConfig {
            thickness: -1.0,
            roughness: 3.0,
            ior: 0.2,
            ..default()
        };
        let m = transmission_material(&cfg, Some(Handle::default()));
        assert_eq!(m.thickness, 0.0);
        assert_eq!(m.perceptual_roughness, 1.0);
        assert_eq!(m.ior, 1.0);
        assert!(m.specular_transmission_texture.is_some());
    }

    #[test]
    fn blur_raises_transmission_roughness() {
        let sharp = TransmissionConfig {
            roughness: 0.2,
            anisotropic_blur: 0.0,
            ..default()
        };
        let blurred = TransmissionConfig {
            anisotropic_blur: 0.3,
            ..sharp.clone()
        };
        let a = transmission_material(&sharp, None).perceptual_roughness;
        let b = transmission_material(&blurred, None).perceptual_roughness;
        assert!((a - 0.2).abs() < 1e-6);
        assert!((b - 0.5).abs() < 1e-6);
    }
}
