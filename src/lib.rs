//! Frequency-domain image watermarking.
//!
//! The DWT scheme hides a grayscale pattern in the coarsest wavelet
//! subbands of a host image and recovers it later by comparing the
//! watermarked image against the original. The LSB scheme is a fragile
//! spatial-domain alternative that needs no reference image.

pub mod core;
pub mod models;
pub mod utils;

use image::GrayImage;

// Re-export primary API types
pub use crate::core::detector::{Detection, WatermarkDetector};
pub use crate::core::dwt::{DetailBands, DwtProcessor, WaveletPyramid};
pub use crate::core::embedder::DwtEmbedder;
pub use crate::core::extractor::DwtExtractor;
pub use crate::core::lsb::LsbWatermarker;
pub use crate::core::pattern::PatternGenerator;
pub use crate::models::{Algorithm, DetectorParams, DwtParams, SubbandWeights, WaveMarkError};

/// Embed a watermark pattern into a grayscale host image.
///
/// Dispatches to [`DwtEmbedder`] or [`LsbWatermarker`] depending on
/// `algorithm`. The LSB scheme ignores `params`.
pub fn embed(
    host: &GrayImage,
    pattern: &GrayImage,
    algorithm: Algorithm,
    params: &DwtParams,
) -> Result<GrayImage, WaveMarkError> {
    match algorithm {
        Algorithm::Dwt => DwtEmbedder::new(params.clone()).embed(host, pattern),
        Algorithm::Lsb => LsbWatermarker::embed(host, pattern),
    }
}

/// Recover a watermark pattern from a watermarked image, resampled to
/// `target_size` (width, height).
///
/// The DWT scheme compares against the original host, so `reference` is
/// required and `None` fails with [`WaveMarkError::MissingReference`].
/// The LSB scheme is blind and ignores `reference`.
pub fn extract(
    candidate: &GrayImage,
    reference: Option<&GrayImage>,
    target_size: (u32, u32),
    algorithm: Algorithm,
    params: &DwtParams,
) -> Result<GrayImage, WaveMarkError> {
    match algorithm {
        Algorithm::Dwt => {
            let original = reference.ok_or_else(|| {
                WaveMarkError::MissingReference(
                    "DWT extraction requires the original host image".to_string(),
                )
            })?;
            DwtExtractor::new(params.clone()).extract(candidate, original, target_size)
        }
        Algorithm::Lsb => LsbWatermarker::extract(candidate, target_size),
    }
}

/// Score an extracted pattern against the expected watermark.
pub fn detect(
    target: &GrayImage,
    candidate: &GrayImage,
    params: &DetectorParams,
) -> Result<Detection, WaveMarkError> {
    WatermarkDetector::new(*params).detect(target, candidate)
}
