use crate::models::WaveMarkError;
use ndarray::{s, Array2, ArrayView2};

/// Multi-level 2D Haar wavelet transform
///
/// Decomposes an image into a pyramid: the approximation subband is
/// re-decomposed at each level, so an L-level transform yields one coarsest
/// approximation plus L sets of detail subbands. Odd-length signals are
/// handled by replicating the final sample (ceil halving), which keeps the
/// Haar transform exactly invertible for unmodified coefficients.
pub struct DwtProcessor {
    levels: usize,
}

/// Detail subbands produced by one decomposition level
///
/// `rows`/`cols` record the shape of the signal that was decomposed at this
/// level, so reconstruction can trim the replicate padding.
#[derive(Debug, Clone)]
pub struct DetailBands {
    /// Horizontal details (LH)
    pub lh: Array2<f64>,
    /// Vertical details (HL)
    pub hl: Array2<f64>,
    /// Diagonal details (HH)
    pub hh: Array2<f64>,
    /// Row count of this level's input
    pub rows: usize,
    /// Column count of this level's input
    pub cols: usize,
}

/// Full decomposition of one image
///
/// `details[0]` holds the finest level, the last entry the coarsest
/// (produced last). Embedding touches `approx` and the coarsest entry only.
#[derive(Debug, Clone)]
pub struct WaveletPyramid {
    /// Coarsest approximation subband (LL)
    pub approx: Array2<f64>,
    /// Per-level detail subbands, finest first
    pub details: Vec<DetailBands>,
}

impl WaveletPyramid {
    /// Number of decomposition levels
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    /// Shape of the coarsest approximation subband
    pub fn coarsest_shape(&self) -> (usize, usize) {
        self.approx.dim()
    }
}

impl DwtProcessor {
    pub fn new(levels: usize) -> Self {
        Self { levels }
    }

    /// Perform multi-level DWT decomposition on image data
    ///
    /// # Arguments
    /// * `image_data` - 2D array of image data (grayscale intensities as f64)
    ///
    /// # Returns
    /// * `WaveletPyramid` with the coarsest approximation and all detail levels
    ///
    /// # Algorithm
    /// 1. Apply 1D Haar transform to each row, then to each column
    /// 2. Keep the three detail subbands, recurse on the approximation
    /// 3. Repeat until the requested depth is reached
    pub fn decompose(&self, image_data: ArrayView2<f64>) -> Result<WaveletPyramid, WaveMarkError> {
        let (rows, cols) = image_data.dim();
        self.check_depth(rows, cols)?;

        let mut approx = image_data.to_owned();
        let mut details = Vec::with_capacity(self.levels);

        for _ in 0..self.levels {
            let (cur_rows, cur_cols) = approx.dim();
            let (ll, lh, hl, hh) = self.dwt_2d(&approx);
            details.push(DetailBands {
                lh,
                hl,
                hh,
                rows: cur_rows,
                cols: cur_cols,
            });
            approx = ll;
        }

        Ok(WaveletPyramid { approx, details })
    }

    /// Reconstruct image data from a pyramid
    ///
    /// Runs the synthesis step coarsest to finest. The result is real-valued
    /// and not clamped; for unmodified coefficients it matches the decomposed
    /// image up to floating-point rounding.
    pub fn reconstruct(&self, pyramid: WaveletPyramid) -> Result<Array2<f64>, WaveMarkError> {
        let mut current = pyramid.approx;
        for bands in pyramid.details.iter().rev() {
            current = self.idwt_2d(
                &current,
                &bands.lh,
                &bands.hl,
                &bands.hh,
                bands.rows,
                bands.cols,
            )?;
        }
        Ok(current)
    }

    /// Verify that every level sees at least a 2x2 input
    fn check_depth(&self, rows: usize, cols: usize) -> Result<(), WaveMarkError> {
        let (mut r, mut c) = (rows, cols);
        for level in 0..self.levels {
            if r < 2 || c < 2 {
                return Err(WaveMarkError::InvalidDimension(format!(
                    "Image of {}x{} supports only {} decomposition level(s), {} requested",
                    rows, cols, level, self.levels
                )));
            }
            r = (r + 1) / 2;
            c = (c + 1) / 2;
        }
        Ok(())
    }

    /// Perform one 2D Haar analysis step
    ///
    /// Returns (LL, LH, HL, HH) subbands, each of ceil-halved shape
    fn dwt_2d(&self, data: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array2<f64>, Array2<f64>) {
        let (rows, cols) = data.dim();
        let half_r = (rows + 1) / 2;
        let half_c = (cols + 1) / 2;

        // Step 1: transform rows
        let mut row_low = Array2::zeros((rows, half_c));
        let mut row_high = Array2::zeros((rows, half_c));
        for i in 0..rows {
            let row_vec = data.slice(s![i, ..]).to_vec();
            let (low, high) = self.haar_1d(&row_vec);
            for j in 0..half_c {
                row_low[[i, j]] = low[j];
                row_high[[i, j]] = high[j];
            }
        }

        // Step 2: transform the columns of both halves
        let mut ll = Array2::zeros((half_r, half_c));
        let mut hl = Array2::zeros((half_r, half_c));
        let mut lh = Array2::zeros((half_r, half_c));
        let mut hh = Array2::zeros((half_r, half_c));
        for j in 0..half_c {
            let col_vec = row_low.slice(s![.., j]).to_vec();
            let (low, high) = self.haar_1d(&col_vec);
            for i in 0..half_r {
                ll[[i, j]] = low[i];
                hl[[i, j]] = high[i];
            }

            let col_vec = row_high.slice(s![.., j]).to_vec();
            let (low, high) = self.haar_1d(&col_vec);
            for i in 0..half_r {
                lh[[i, j]] = low[i];
                hh[[i, j]] = high[i];
            }
        }

        (ll, lh, hl, hh)
    }

    /// Perform one 2D Haar synthesis step
    ///
    /// `rows`/`cols` give the pre-decomposition shape; padded samples are
    /// trimmed after inversion.
    fn idwt_2d(
        &self,
        ll: &Array2<f64>,
        lh: &Array2<f64>,
        hl: &Array2<f64>,
        hh: &Array2<f64>,
        rows: usize,
        cols: usize,
    ) -> Result<Array2<f64>, WaveMarkError> {
        let (half_r, half_c) = ll.dim();
        for (name, band) in [("LH", lh), ("HL", hl), ("HH", hh)] {
            if band.dim() != (half_r, half_c) {
                return Err(WaveMarkError::ShapeMismatch(format!(
                    "{} subband is {:?}, expected {:?}",
                    name,
                    band.dim(),
                    (half_r, half_c)
                )));
            }
        }
        if (rows + 1) / 2 != half_r || (cols + 1) / 2 != half_c {
            return Err(WaveMarkError::ShapeMismatch(format!(
                "Subbands of {:?} cannot reconstruct a {}x{} signal",
                (half_r, half_c),
                rows,
                cols
            )));
        }

        // Step 1: inverse transform columns of both halves
        let mut row_low = Array2::zeros((rows, half_c));
        let mut row_high = Array2::zeros((rows, half_c));
        for j in 0..half_c {
            let low = ll.slice(s![.., j]).to_vec();
            let high = hl.slice(s![.., j]).to_vec();
            let rec = self.ihaar_1d(&low, &high, rows)?;
            for i in 0..rows {
                row_low[[i, j]] = rec[i];
            }

            let low = lh.slice(s![.., j]).to_vec();
            let high = hh.slice(s![.., j]).to_vec();
            let rec = self.ihaar_1d(&low, &high, rows)?;
            for i in 0..rows {
                row_high[[i, j]] = rec[i];
            }
        }

        // Step 2: inverse transform rows
        let mut result = Array2::zeros((rows, cols));
        for i in 0..rows {
            let low = row_low.slice(s![i, ..]).to_vec();
            let high = row_high.slice(s![i, ..]).to_vec();
            let rec = self.ihaar_1d(&low, &high, cols)?;
            for j in 0..cols {
                result[[i, j]] = rec[j];
            }
        }

        Ok(result)
    }

    /// 1D Haar wavelet transform
    ///
    /// Computes averages (low frequencies) and differences (high frequencies):
    /// - Low: (x[2i] + x[2i+1]) / sqrt(2)
    /// - High: (x[2i] - x[2i+1]) / sqrt(2)
    ///
    /// An odd-length signal replicates its final sample, producing a zero
    /// difference and an exactly recoverable pair.
    fn haar_1d(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let len = signal.len();
        let half_len = (len + 1) / 2;
        let mut low = Vec::with_capacity(half_len);
        let mut high = Vec::with_capacity(half_len);

        let sqrt2 = std::f64::consts::SQRT_2;

        for i in 0..half_len {
            let even = signal[2 * i];
            let odd = if 2 * i + 1 < len {
                signal[2 * i + 1]
            } else {
                even
            };

            // Averaging (approximation)
            low.push((even + odd) / sqrt2);

            // Differencing (detail)
            high.push((even - odd) / sqrt2);
        }

        (low, high)
    }

    /// 1D inverse Haar wavelet transform
    ///
    /// Reconstructs `target_len` samples from low and high coefficients:
    /// - x[2i] = (low[i] + high[i]) / sqrt(2)
    /// - x[2i+1] = (low[i] - high[i]) / sqrt(2)
    fn ihaar_1d(
        &self,
        low: &[f64],
        high: &[f64],
        target_len: usize,
    ) -> Result<Vec<f64>, WaveMarkError> {
        if low.len() != high.len() {
            return Err(WaveMarkError::ShapeMismatch(format!(
                "Low ({}) and high ({}) coefficient counts differ",
                low.len(),
                high.len()
            )));
        }
        if (target_len + 1) / 2 != low.len() {
            return Err(WaveMarkError::ShapeMismatch(format!(
                "{} coefficient pairs cannot reconstruct {} samples",
                low.len(),
                target_len
            )));
        }

        let mut signal = Vec::with_capacity(low.len() * 2);

        let sqrt2 = std::f64::consts::SQRT_2;

        for i in 0..low.len() {
            let l = low[i];
            let h = high[i];

            // Reconstruct even sample
            signal.push((l + h) / sqrt2);

            // Reconstruct odd sample
            signal.push((l - h) / sqrt2);
        }

        signal.truncate(target_len);
        Ok(signal)
    }
}
