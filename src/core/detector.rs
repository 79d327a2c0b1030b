use image::GrayImage;
use serde::Serialize;

use crate::models::{DetectorParams, WaveMarkError};

/// Variance floor below which correlation is defined as zero
const VARIANCE_EPS: f64 = 1e-10;

/// Result of a presence check
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    /// Score strictly above the threshold
    pub detected: bool,
    /// Pearson correlation in [-1, 1]
    pub score: f64,
}

/// Pearson-correlation watermark detector
///
/// Compares a reference pattern against an extracted candidate of the same
/// pixel count. Degenerate inputs (near-zero variance, e.g. an all-black
/// candidate) score 0.0 rather than NaN, so they never pass the threshold.
pub struct WatermarkDetector {
    params: DetectorParams,
}

impl WatermarkDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    /// Score the candidate against the target pattern and apply the threshold
    pub fn detect(
        &self,
        target: &GrayImage,
        candidate: &GrayImage,
    ) -> Result<Detection, WaveMarkError> {
        let score = self.correlation(target, candidate)?;
        Ok(Detection {
            detected: score > self.params.threshold,
            score,
        })
    }

    /// Pearson correlation between two patterns of equal pixel count
    pub fn correlation(
        &self,
        target: &GrayImage,
        candidate: &GrayImage,
    ) -> Result<f64, WaveMarkError> {
        if target.len() != candidate.len() {
            return Err(WaveMarkError::ShapeMismatch(format!(
                "Target pattern has {} samples but candidate has {}",
                target.len(),
                candidate.len()
            )));
        }
        let a: Vec<f64> = target.pixels().map(|p| p[0] as f64).collect();
        let b: Vec<f64> = candidate.pixels().map(|p| p[0] as f64).collect();
        Ok(pearson(&a, &b))
    }
}

/// Pearson correlation coefficient of two equal-length sample sets
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.len() {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        covariance += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator < VARIANCE_EPS {
        return 0.0;
    }
    covariance / denominator
}
