//! CPU conversion of an equirectangular panorama into a six-layer cubemap.
use std::f32::consts::PI;

use anyhow::{bail, ensure, Context, Result};
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{
    Extent3d, TextureDimension, TextureFormat, TextureViewDescriptor, TextureViewDimension,
};
use half::f16;

/// Texels of an equirectangular image decoded to linear RGBA.
pub struct Panorama {
    width: usize,
    height: usize,
    texels: Vec<Vec4>,
}

impl Panorama {
    pub fn from_image(image: &Image) -> Result<Self> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        ensure!(width > 0 && height > 0, "panorama has zero size");
        let data = image.data.as_deref().context("panorama has no CPU-side data")?;
        let format = image.texture_descriptor.format;
        let texels: Vec<Vec4> = match format {
            TextureFormat::Rgba32Float => data
                .chunks_exact(16)
                .map(|c| Vec4::from_array(bytemuck::pod_read_unaligned::<[f32; 4]>(c)))
                .collect(),
            TextureFormat::Rgba16Float => data
                .chunks_exact(8)
                .map(|c| {
                    let h = bytemuck::pod_read_unaligned::<[u16; 4]>(c);
                    Vec4::from_array(h.map(|bits| f16::from_bits(bits).to_f32()))
                })
                .collect(),
            other => bail!("unsupported panorama format {other:?}"),
        };
        ensure!(
            texels.len() == width * height,
            "panorama data holds {} texels, expected {}",
            texels.len(),
            width * height
        );
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    fn texel(&self, x: usize, y: usize) -> Vec4 {
        self.texels[y * self.width + x]
    }

    /// Bilinear lookup along a direction; wraps horizontally, clamps at the poles.
    pub fn sample(&self, dir: Vec3) -> Vec4 {
        let d = dir.normalize_or_zero();
        let phi = d.z.atan2(d.x);
        let theta = d.y.clamp(-1.0, 1.0).acos();
        let u = (phi / (2.0 * PI) + 0.5) * self.width as f32 - 0.5;
        let v = (theta / PI) * self.height as f32 - 0.5;

        let x0 = u.floor();
        let y0 = v.floor();
        let (fx, fy) = (u - x0, v - y0);
        let wrap = |x: f32| (x as i64).rem_euclid(self.width as i64) as usize;
        let clamp = |y: f32| (y.max(0.0) as usize).min(self.height - 1);
        let (xa, xb) = (wrap(x0), wrap(x0 + 1.0));
        let (ya, yb) = (clamp(y0), clamp(y0 + 1.0));
        let top = self.texel(xa, ya).lerp(self.texel(xb, ya), fx);
        let bottom = self.texel(xa, yb).lerp(self.texel(xb, yb), fx);
        top.lerp(bottom, fy)
    }
}

/// Direction through texel centre `(x, y)` of cube face `face`
/// (order +X, -X, +Y, -Y, +Z, -Z; y grows downward on each face).
pub fn face_direction(face: usize, x: u32, y: u32, size: u32) -> Vec3 {
    let s = size as f32;
    let u = 2.0 * (x as f32 + 0.5) / s - 1.0;
    let v = 2.0 * (y as f32 + 0.5) / s - 1.0;
    match face {
        0 => Vec3::new(1.0, -v, -u),
        1 => Vec3::new(-1.0, -v, u),
        2 => Vec3::new(u, 1.0, v),
        3 => Vec3::new(u, -1.0, -v),
        4 => Vec3::new(u, -v, 1.0),
        _ => Vec3::new(-u, -v, -1.0),
    }
    .normalize()
}

/// Build an `Rgba16Float` cube texture with `face_size²` texels per face.
pub fn equirect_to_cubemap(source: &Image, face_size: u32) -> Result<Image> {
    ensure!(face_size > 0, "cubemap face size must be > 0");
    let panorama = Panorama::from_image(source)?;
    let mut halfs: Vec<u16> = Vec::with_capacity((face_size * face_size * 6 * 4) as usize);
    for face in 0..6 {
        for y in 0..face_size {
            for x in 0..face_size {
                let c = panorama.sample(face_direction(face, x, y, face_size));
                halfs.extend([c.x, c.y, c.z, 1.0].map(|v| f16::from_f32(v).to_bits()));
            }
        }
    }
    let mut image = Image::new(
        Extent3d {
            width: face_size,
            height: face_size,
            depth_or_array_layers: 6,
        },
        TextureDimension::D2,
        bytemuck::cast_slice(&halfs).to_vec(),
        TextureFormat::Rgba16Float,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.texture_view_descriptor = Some(TextureViewDescriptor {
        dimension: Some(TextureViewDimension::Cube),
        ..default()
    });
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panorama_image(width: u32, height: u32, f: impl Fn(u32, u32) -> [f32; 4]) -> Image {
        let mut texels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Image::new(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            bytemuck::cast_slice(&texels).to_vec(),
            TextureFormat::Rgba32Float,
            RenderAssetUsages::default(),
        )
    }

    fn read_texel(cube: &Image, face: u32, x: u32, y: u32) -> Vec4 {
        let size = cube.width();
        let i = (((face * size + y) * size + x) * 8) as usize;
        let data = cube.data.as_deref().unwrap();
        let h = bytemuck::pod_read_unaligned::<[u16; 4]>(&data[i..i + 8]);
        Vec4::from_array(h.map(|b| f16::from_bits(b).to_f32()))
    }

    #[test]
    fn uniform_panorama_gives_uniform_cube() {
        let src = panorama_image(16, 8, |_, _| [0.25, 0.5, 2.0, 1.0]);
        let cube = equirect_to_cubemap(&src, 4).unwrap();
        assert_eq!(cube.texture_descriptor.size.depth_or_array_layers, 6);
        assert_eq!(cube.texture_descriptor.format, TextureFormat::Rgba16Float);
        for face in 0..6 {
            for (x, y) in [(0, 0), (3, 3), (1, 2)] {
                let c = read_texel(&cube, face, x, y);
                assert!((c - Vec4::new(0.25, 0.5, 2.0, 1.0)).abs().max_element() < 1e-3, "{c}");
            }
        }
    }

    #[test]
    fn sky_and_ground_land_on_top_and_bottom_faces() {
        // Upper half red, lower half blue.
        let src = panorama_image(32, 16, |_, y| {
            if y < 8 {
                [1.0, 0.0, 0.0, 1.0]
            } else {
                [0.0, 0.0, 1.0, 1.0]
            }
        });
        let cube = equirect_to_cubemap(&src, 8).unwrap();
        let up = read_texel(&cube, 2, 4, 4);
        let down = read_texel(&cube, 3, 4, 4);
        assert!(up.x > 0.99 && up.z < 0.01, "{up}");
        assert!(down.z > 0.99 && down.x < 0.01, "{down}");
    }

    #[test]
    fn face_centres_point_along_axes() {
        let expected = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        for (face, axis) in expected.iter().enumerate() {
            // Odd size so a texel sits exactly at the centre.
            let d = face_direction(face, 2, 2, 5);
            assert!(d.dot(*axis) > 0.9999, "face {face}: {d}");
        }
    }

    #[test]
    fn rejects_unsupported_input() {
        let ldr = Image::new_fill(
            Extent3d {
                width: 4,
                height: 2,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[255, 255, 255, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        );
        assert!(equirect_to_cubemap(&ldr, 4).is_err());
        let src = panorama_image(4, 2, |_, _| [1.0; 4]);
        assert!(equirect_to_cubemap(&src, 0).is_err());
    }
}
