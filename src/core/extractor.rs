use image::GrayImage;
use ndarray::Array2;

use crate::core::dwt::{DwtProcessor, WaveletPyramid};
use crate::core::raster;
use crate::models::{DwtParams, WaveMarkError};

/// 比值还原时的除零保护项
const DIV_EPS: f64 = 1e-8;

/// 频域水印提取流水线（需要原始宿主图作参照）
///
/// ## 算法
///
/// 1. 含水印图与原图分别做同深度 DWT 分解
/// 2. 对每个参与嵌入的子带按系数比值还原水印估计：
///    `W ≈ (C_w / (C_o + 1e-8) - 1) / (α·weight)`
/// 3. 各子带估计逐元素取平均
/// 4. [-1, 1] 线性映射回 [0, 255] 并钳制
/// 5. 自适应二值化：阈值 = 均值 + k·标准差，高于阈值为 255，否则 0
/// 6. Lanczos 重采样到目标尺寸
///
/// 分解深度必须与嵌入时一致。深度不一致不会报错，只会得到噪声输出，
/// 因为图片本身不携带任何嵌入参数。
pub struct DwtExtractor {
    params: DwtParams,
}

impl DwtExtractor {
    pub fn new(params: DwtParams) -> Self {
        Self { params }
    }

    /// 从含水印灰度图中提取二值水印图案
    ///
    /// # 参数
    /// * `watermarked` - 含水印图
    /// * `original`    - 原始宿主图（尺寸必须一致）
    /// * `target_size` - 输出图案尺寸 (width, height)
    pub fn extract(
        &self,
        watermarked: &GrayImage,
        original: &GrayImage,
        target_size: (u32, u32),
    ) -> Result<GrayImage, WaveMarkError> {
        if watermarked.dimensions() != original.dimensions() {
            return Err(WaveMarkError::InvalidDimension(format!(
                "Watermarked image is {:?} but original is {:?}",
                watermarked.dimensions(),
                original.dimensions()
            )));
        }
        self.extract_array(
            &raster::gray_to_array(watermarked),
            &raster::gray_to_array(original),
            target_size,
        )
    }

    /// 浮点流水线版本：直接在实数值网格上提取
    pub fn extract_array(
        &self,
        watermarked: &Array2<f64>,
        original: &Array2<f64>,
        target_size: (u32, u32),
    ) -> Result<GrayImage, WaveMarkError> {
        self.params.validate()?;
        if watermarked.dim() != original.dim() {
            return Err(WaveMarkError::InvalidDimension(format!(
                "Watermarked grid is {:?} but original is {:?}",
                watermarked.dim(),
                original.dim()
            )));
        }
        if target_size.0 == 0 || target_size.1 == 0 {
            return Err(WaveMarkError::InvalidDimension(format!(
                "Target pattern size must be nonzero, got {:?}",
                target_size
            )));
        }

        let processor = DwtProcessor::new(self.params.levels);
        let marked = processor.decompose(watermarked.view())?;
        let reference = processor.decompose(original.view())?;

        let combined = self.combine_band_estimates(&marked, &reference);
        let binary = self.binarize(&combined);

        let image = raster::array_to_gray(&binary);
        Ok(raster::resize_gray(&image, target_size.0, target_size.1))
    }

    // ─── 核心提取逻辑 ─────────────────────────────────────────────────────────

    /// 对参与嵌入的子带分别估计水印并逐元素取平均，输出值域约 [-1, 1]
    fn combine_band_estimates(
        &self,
        marked: &WaveletPyramid,
        reference: &WaveletPyramid,
    ) -> Array2<f64> {
        let alpha = self.params.alpha;
        let weights = self.params.weights;

        let mut sum = Array2::zeros(marked.coarsest_shape());
        let mut bands = 0usize;

        let mut accumulate = |m: &Array2<f64>, r: &Array2<f64>, weight: f64| {
            if weight == 0.0 {
                return;
            }
            let strength = alpha * weight;
            let (rows, cols) = m.dim();
            for i in 0..rows {
                for j in 0..cols {
                    sum[[i, j]] += (m[[i, j]] / (r[[i, j]] + DIV_EPS) - 1.0) / strength;
                }
            }
            bands += 1;
        };

        accumulate(&marked.approx, &reference.approx, weights.approx);
        if let (Some(m), Some(r)) = (marked.details.last(), reference.details.last()) {
            accumulate(&m.lh, &r.lh, weights.horizontal);
            accumulate(&m.hl, &r.hl, weights.vertical);
            accumulate(&m.hh, &r.hh, weights.diagonal);
        }

        // validate() 保证至少一个子带参与
        sum / bands as f64
    }

    /// 自适应二值化：重缩放到 [0, 255]，阈值取 均值 + k·标准差
    fn binarize(&self, estimate: &Array2<f64>) -> Array2<f64> {
        let rescaled = estimate.mapv(|v| (((v + 1.0) / 2.0) * 255.0).clamp(0.0, 255.0));
        let mean = rescaled.mean().unwrap_or(0.0);
        let std = rescaled.std(0.0);
        let threshold = mean + self.params.binarize_k * std;
        rescaled.mapv(|v| if v > threshold { 255.0 } else { 0.0 })
    }
}
