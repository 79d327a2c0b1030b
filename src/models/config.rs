use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::error::WaveMarkError;

/// Embedding scheme selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    /// Frequency domain: Haar wavelet pyramid with multiplicative subband embedding
    Dwt,
    /// Spatial domain: least-significant-bit plane
    Lsb,
}

impl FromStr for Algorithm {
    type Err = WaveMarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dwt" => Ok(Algorithm::Dwt),
            "lsb" => Ok(Algorithm::Lsb),
            other => Err(WaveMarkError::InvalidConfig(format!(
                "Unknown algorithm '{}' (expected 'dwt' or 'lsb')",
                other
            ))),
        }
    }
}

/// Per-subband embedding weights at the coarsest pyramid level.
///
/// A weight of zero leaves the band untouched during embedding and excludes
/// it from the extraction average. The effective strength of a band is
/// `alpha * weight`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubbandWeights {
    /// Coarsest approximation (LL)
    pub approx: f64,
    /// Horizontal detail (LH)
    pub horizontal: f64,
    /// Vertical detail (HL)
    pub vertical: f64,
    /// Diagonal detail (HH)
    pub diagonal: f64,
}

impl Default for SubbandWeights {
    fn default() -> Self {
        Self {
            approx: 1.0,
            horizontal: 0.5,
            vertical: 0.5,
            diagonal: 0.0,
        }
    }
}

impl SubbandWeights {
    /// Number of bands that participate in embedding/extraction
    pub fn active_bands(&self) -> usize {
        [self.approx, self.horizontal, self.vertical, self.diagonal]
            .iter()
            .filter(|w| **w != 0.0)
            .count()
    }
}

/// DWT embedding / extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DwtParams {
    /// Global embedding strength factor
    pub alpha: f64,
    /// Pyramid decomposition depth
    pub levels: usize,
    /// Per-subband weight factors
    pub weights: SubbandWeights,
    /// Binarization offset: threshold = mean + binarize_k * std
    pub binarize_k: f64,
    /// Run a 3x3 smoothing pass over the watermarked image
    pub smooth_output: bool,
}

impl Default for DwtParams {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            levels: 3,
            weights: SubbandWeights::default(),
            binarize_k: 0.2,
            smooth_output: false,
        }
    }
}

impl DwtParams {
    pub fn new(alpha: f64, levels: usize) -> Self {
        Self {
            alpha,
            levels,
            ..Self::default()
        }
    }

    /// Check parameters before running a pipeline.
    ///
    /// Extraction divides by `alpha * weight`, so alpha must be positive and
    /// at least one band weight nonzero.
    pub fn validate(&self) -> Result<(), WaveMarkError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(WaveMarkError::InvalidConfig(format!(
                "alpha must be positive and finite, got {}",
                self.alpha
            )));
        }
        if self.levels == 0 {
            return Err(WaveMarkError::InvalidConfig(
                "levels must be at least 1".to_string(),
            ));
        }
        let w = &self.weights;
        for (name, value) in [
            ("approx", w.approx),
            ("horizontal", w.horizontal),
            ("vertical", w.vertical),
            ("diagonal", w.diagonal),
        ] {
            if !value.is_finite() {
                return Err(WaveMarkError::InvalidConfig(format!(
                    "weight '{}' must be finite, got {}",
                    name, value
                )));
            }
        }
        if w.active_bands() == 0 {
            return Err(WaveMarkError::InvalidConfig(
                "at least one subband weight must be nonzero".to_string(),
            ));
        }
        if !self.binarize_k.is_finite() {
            return Err(WaveMarkError::InvalidConfig(format!(
                "binarizeK must be finite, got {}",
                self.binarize_k
            )));
        }
        Ok(())
    }
}

/// Correlation detector parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorParams {
    /// Presence threshold on the Pearson score (strictly greater passes)
    pub threshold: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}
