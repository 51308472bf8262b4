use crate::core::color::{pack_unorm_4x8, unpack_unorm_4x8};
use crate::error::{Error, Result};
use log::info;
use nalgebra::{Vector2, Vector4};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    pub filter: Filter,
    pub address_mode: AddressMode,
}

impl Sampler {
    pub const NEAREST: Self = Self::new(Filter::Nearest, AddressMode::Repeat);
    pub const LINEAR: Self = Self::new(Filter::Linear, AddressMode::Repeat);
    pub const NEAREST_CLAMP: Self = Self::new(Filter::Nearest, AddressMode::ClampToEdge);
    pub const LINEAR_CLAMP: Self = Self::new(Filter::Linear, AddressMode::ClampToEdge);

    pub const fn new(filter: Filter, address_mode: AddressMode) -> Self {
        Self {
            filter,
            address_mode,
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::LINEAR
    }
}

/// 2D `R8G8B8A8_UNORM` image. Texel (0, 0) is the top-left corner, which is
/// where UV (0, 0) points.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<u32>,
}

impl Texture {
    /// `pixels` holds tightly packed RGBA8 rows, top row first.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidTexture(format!(
                "zero-sized texture {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidTexture(format!(
                "{width}x{height} texture needs {expected} bytes, got {}",
                pixels.len()
            )));
        }

        let texels = pixels
            .chunks_exact(4)
            .map(|p| u32::from_le_bytes([p[0], p[1], p[2], p[3]]))
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Builds a texture from already packed texels (see [`pack_unorm_4x8`]).
    pub fn from_packed(width: u32, height: u32, texels: Vec<u32>) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != width as usize * height as usize {
            return Err(Error::InvalidTexture(format!(
                "{} packed texels do not fill {width}x{height}",
                texels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// 1x1 texture of a single color.
    pub fn solid(color: Vector4<f32>) -> Self {
        Self {
            width: 1,
            height: 1,
            texels: vec![pack_unorm_4x8(color)],
        }
    }

    /// `size`x`size` checkerboard of single texels, `a` at the origin.
    pub fn checkerboard(size: u32, a: Vector4<f32>, b: Vector4<f32>) -> Self {
        let size = size.max(1);
        let (a, b) = (pack_unorm_4x8(a), pack_unorm_4x8(b));
        let texels = (0..size)
            .flat_map(|y| (0..size).map(move |x| if (x ^ y) & 1 == 0 { a } else { b }))
            .collect();
        Self {
            width: size,
            height: size,
            texels,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| Error::TextureLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        info!("Loaded texture: {:?} ({}x{})", path, width, height);
        Self::from_rgba8(width, height, img.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Texel at integer coordinates, decoded to `[0, 1]` floats.
    pub fn texel(&self, x: u32, y: u32) -> Option<Vector4<f32>> {
        (x < self.width && y < self.height)
            .then(|| unpack_unorm_4x8(self.texels[(y * self.width + x) as usize]))
    }

    /// Samples at `uv` with the sampler's filter and address mode. Values are
    /// returned as stored: no sRGB decode.
    pub fn sample(&self, sampler: &Sampler, uv: Vector2<f32>) -> Vector4<f32> {
        // Texel space: texel centres sit at half-integers.
        let x = uv.x * self.width as f32;
        let y = uv.y * self.height as f32;

        match sampler.filter {
            Filter::Nearest => self.fetch(sampler.address_mode, x.floor() as i64, y.floor() as i64),
            Filter::Linear => {
                let (x, y) = (x - 0.5, y - 0.5);
                let (x0, y0) = (x.floor(), y.floor());
                let (fx, fy) = (x - x0, y - y0);
                // Casts saturate for huge or infinite UVs; the neighbour must too.
                let (x0, y0) = (x0 as i64, y0 as i64);
                let (x1, y1) = (x0.saturating_add(1), y0.saturating_add(1));
                let mode = sampler.address_mode;

                let top = self.fetch(mode, x0, y0) * (1.0 - fx) + self.fetch(mode, x1, y0) * fx;
                let bottom = self.fetch(mode, x0, y1) * (1.0 - fx) + self.fetch(mode, x1, y1) * fx;
                top * (1.0 - fy) + bottom * fy
            }
        }
    }

    fn fetch(&self, mode: AddressMode, x: i64, y: i64) -> Vector4<f32> {
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let (x, y) = match mode {
            AddressMode::Repeat => (x.rem_euclid(w), y.rem_euclid(h)),
            AddressMode::ClampToEdge => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
        };
        unpack_unorm_4x8(self.texels[(y * w + x) as usize])
    }
}

pub const WHITE: Vector4<f32> = Vector4::new(1.0, 1.0, 1.0, 1.0);
pub const GREY: Vector4<f32> = Vector4::new(0.66, 0.66, 0.66, 1.0);
pub const BLACK: Vector4<f32> = Vector4::new(0.0, 0.0, 0.0, 0.0);
pub const MAGENTA: Vector4<f32> = Vector4::new(1.0, 0.0, 1.0, 1.0);

const ERROR_CHECKER_SIZE: u32 = 16;

/// Fallback images every material can bind.
#[derive(Debug, Clone)]
pub struct DefaultTextures {
    pub white: Arc<Texture>,
    pub grey: Arc<Texture>,
    pub black: Arc<Texture>,
    /// Magenta/black checkerboard marking missing data.
    pub error: Arc<Texture>,
}

impl Default for DefaultTextures {
    fn default() -> Self {
        Self {
            white: Arc::new(Texture::solid(WHITE)),
            grey: Arc::new(Texture::solid(GREY)),
            black: Arc::new(Texture::solid(BLACK)),
            error: Arc::new(Texture::checkerboard(ERROR_CHECKER_SIZE, BLACK, MAGENTA)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DefaultSamplers {
    pub nearest: Sampler,
    pub linear: Sampler,
}

impl Default for DefaultSamplers {
    fn default() -> Self {
        Self {
            nearest: Sampler::NEAREST,
            linear: Sampler::LINEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Texture {
        // 2x2: red, green / blue, white
        Texture::from_rgba8(
            2,
            2,
            vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ],
        )
        .unwrap()
    }

    #[test]
    fn clamped_uv_extremes_hit_opposite_corners() {
        let tex = corners();
        for sampler in [Sampler::NEAREST_CLAMP, Sampler::LINEAR_CLAMP] {
            let red = Vector4::new(1.0, 0.0, 0.0, 1.0);
            let white = Vector4::new(1.0, 1.0, 1.0, 1.0);
            assert_eq!(tex.sample(&sampler, Vector2::new(0.0, 0.0)), red);
            assert_eq!(tex.sample(&sampler, Vector2::new(1.0, 1.0)), white);
        }
    }

    #[test]
    fn v_runs_top_to_bottom() {
        let tex = corners();
        let bottom_left = tex.sample(&Sampler::NEAREST_CLAMP, Vector2::new(0.1, 0.9));
        assert_eq!(bottom_left, Vector4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn repeat_wraps_past_one() {
        let tex = corners();
        let wrapped = tex.sample(&Sampler::NEAREST, Vector2::new(1.25, 0.25));
        assert_eq!(wrapped, tex.texel(0, 0).unwrap());
    }

    #[test]
    fn linear_filter_blends_at_texel_boundary() {
        let tex = corners();
        let mid_top = tex.sample(&Sampler::LINEAR_CLAMP, Vector2::new(0.5, 0.25));
        assert!((mid_top - Vector4::new(0.5, 0.5, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn huge_uvs_stay_in_bounds() {
        let tex = Texture::solid(WHITE);
        let samplers = [
            Sampler::NEAREST,
            Sampler::LINEAR,
            Sampler::NEAREST_CLAMP,
            Sampler::LINEAR_CLAMP,
        ];
        for sampler in samplers {
            for uv in [Vector2::new(1e30, 0.5), Vector2::new(-1e30, -1e30)] {
                assert_eq!(tex.sample(&sampler, uv), WHITE, "{sampler:?} at {uv:?}");
            }
            tex.sample(&sampler, Vector2::new(f32::INFINITY, f32::NEG_INFINITY));
        }
    }

    #[test]
    fn error_texture_is_magenta_checker() {
        let defaults = DefaultTextures::default();
        let err = &defaults.error;
        assert_eq!((err.width(), err.height()), (16, 16));
        assert_eq!(err.texel(0, 0), Some(BLACK));
        assert_eq!(err.texel(1, 0), Some(MAGENTA));
        assert_eq!(err.texel(1, 1), Some(BLACK));
    }

    #[test]
    fn mis_sized_data_is_rejected() {
        assert!(Texture::from_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(Texture::from_rgba8(0, 2, vec![]).is_err());
        assert!(Texture::from_packed(2, 1, vec![0]).is_err());
    }
}
