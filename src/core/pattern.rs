use image::{DynamicImage, GrayImage, Luma};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::core::raster;
use crate::models::WaveMarkError;

/// Watermark pattern factory
///
/// Patterns are plain grayscale images. The embedding pipelines resample them
/// to whatever subband size they need, so any source size works; small sizes
/// (e.g. 64x64) survive that resampling best.
pub struct PatternGenerator;

impl PatternGenerator {
    /// Build a pattern from an arbitrary image (grayscale + Lanczos resample)
    pub fn from_image(
        source: &DynamicImage,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, WaveMarkError> {
        check_size(width, height)?;
        Ok(raster::resize_gray(&source.to_luma8(), width, height))
    }

    /// Binary checkerboard with square cells of `cell` pixels
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> Result<GrayImage, WaveMarkError> {
        check_size(width, height)?;
        if cell == 0 {
            return Err(WaveMarkError::InvalidConfig(
                "Checkerboard cell size must be at least 1".to_string(),
            ));
        }
        Ok(GrayImage::from_fn(width, height, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        }))
    }

    /// Deterministic binary noise pattern for the given seed
    pub fn noise(width: u32, height: u32, seed: u64) -> Result<GrayImage, WaveMarkError> {
        check_size(width, height)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut image = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = if rng.gen_bool(0.5) { 255u8 } else { 0u8 };
                image.put_pixel(x, y, Luma([v]));
            }
        }
        Ok(image)
    }
}

fn check_size(width: u32, height: u32) -> Result<(), WaveMarkError> {
    if width == 0 || height == 0 {
        return Err(WaveMarkError::InvalidDimension(format!(
            "Pattern size must be nonzero, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
