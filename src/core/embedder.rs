use image::GrayImage;
use ndarray::Array2;

use crate::core::dwt::{DwtProcessor, WaveletPyramid};
use crate::core::raster;
use crate::models::{DwtParams, WaveMarkError};

/// 频域水印嵌入流水线
///
/// ## 算法
///
/// 1. 宿主灰度图做 **多级 Haar DWT**（默认 3 级），得到小波金字塔
/// 2. 水印图案 Lanczos 重采样到最粗近似子带的尺寸，归一化到 [-1, 1]
/// 3. 乘性嵌入最粗一层：近似子带 `A' = A · (1 + α·W)`，
///    水平/垂直细节 `D' = D · (1 + 0.5α·W)`，对角细节不动
/// 4. 逆变换重建，像素值钳制到 [0, 255]
///
/// 子带权重由 `SubbandWeights` 配置，权重为 0 的子带不参与嵌入。
pub struct DwtEmbedder {
    params: DwtParams,
}

impl DwtEmbedder {
    pub fn new(params: DwtParams) -> Self {
        Self { params }
    }

    /// 完整嵌入流水线：宿主灰度图 → 含水印灰度图
    ///
    /// # 参数
    /// * `host`    - 宿主图（灰度）
    /// * `pattern` - 水印图案（任意尺寸，内部重采样）
    pub fn embed(&self, host: &GrayImage, pattern: &GrayImage) -> Result<GrayImage, WaveMarkError> {
        let marked = self.embed_array(&raster::gray_to_array(host), pattern)?;
        let image = raster::array_to_gray(&marked);
        Ok(if self.params.smooth_output {
            raster::smooth(&image)
        } else {
            image
        })
    }

    /// 浮点流水线版本：返回未量化的实数值网格
    pub fn embed_array(
        &self,
        host: &Array2<f64>,
        pattern: &GrayImage,
    ) -> Result<Array2<f64>, WaveMarkError> {
        self.params.validate()?;

        let processor = DwtProcessor::new(self.params.levels);
        let pyramid = processor.decompose(host.view())?;
        let marked = self.embed_pattern(&pyramid, pattern)?;
        processor.reconstruct(marked)
    }

    // ─── 核心嵌入逻辑 ─────────────────────────────────────────────────────────

    /// 将水印图案乘性嵌入金字塔最粗层的各子带
    ///
    /// 输入金字塔不被修改，返回嵌入后的副本。
    pub fn embed_pattern(
        &self,
        pyramid: &WaveletPyramid,
        pattern: &GrayImage,
    ) -> Result<WaveletPyramid, WaveMarkError> {
        self.params.validate()?;
        if pattern.width() == 0 || pattern.height() == 0 {
            return Err(WaveMarkError::InvalidDimension(
                "Watermark pattern is empty".to_string(),
            ));
        }

        let (rows, cols) = pyramid.coarsest_shape();
        let resized = raster::resize_gray(pattern, cols as u32, rows as u32);
        let signal = raster::normalize_signed(&resized);

        let alpha = self.params.alpha;
        let weights = self.params.weights;

        let mut marked = pyramid.clone();
        apply_band(&mut marked.approx, &signal, alpha * weights.approx);
        if let Some(coarsest) = marked.details.last_mut() {
            apply_band(&mut coarsest.lh, &signal, alpha * weights.horizontal);
            apply_band(&mut coarsest.hl, &signal, alpha * weights.vertical);
            apply_band(&mut coarsest.hh, &signal, alpha * weights.diagonal);
        }

        Ok(marked)
    }
}

/// 对单个子带做乘性嵌入：`C' = C · (1 + strength · W)`
fn apply_band(band: &mut Array2<f64>, signal: &Array2<f64>, strength: f64) {
    if strength == 0.0 {
        return;
    }
    let (rows, cols) = band.dim();
    for i in 0..rows {
        for j in 0..cols {
            band[[i, j]] *= 1.0 + strength * signal[[i, j]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::PatternGenerator;
    use image::Luma;

    fn create_test_gray(width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (((x * 255) / width + (y * 255) / height) / 2) as u8;
                img.put_pixel(x, y, Luma([v]));
            }
        }
        img
    }

    #[test]
    fn test_embed_preserves_dimensions() {
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = create_test_gray(128, 96);
        let pattern = PatternGenerator::checkerboard(64, 64, 8).unwrap();

        let marked = embedder.embed(&host, &pattern).unwrap();
        assert_eq!(marked.dimensions(), (128, 96), "尺寸应保持不变");
    }

    #[test]
    fn test_embed_pattern_leaves_input_untouched() {
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = raster::gray_to_array(&create_test_gray(64, 64));
        let pattern = PatternGenerator::checkerboard(8, 8, 2).unwrap();

        let processor = DwtProcessor::new(3);
        let pyramid = processor.decompose(host.view()).unwrap();
        let approx_before = pyramid.approx.clone();

        let _marked = embedder.embed_pattern(&pyramid, &pattern).unwrap();

        assert_eq!(pyramid.approx, approx_before, "输入金字塔不应被修改");
    }

    #[test]
    fn test_embed_diagonal_band_untouched() {
        // 默认权重下 HH 子带不参与嵌入
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = raster::gray_to_array(&create_test_gray(64, 64));
        let pattern = PatternGenerator::checkerboard(8, 8, 2).unwrap();

        let processor = DwtProcessor::new(3);
        let pyramid = processor.decompose(host.view()).unwrap();
        let marked = embedder.embed_pattern(&pyramid, &pattern).unwrap();

        let original_hh = &pyramid.details.last().unwrap().hh;
        let marked_hh = &marked.details.last().unwrap().hh;
        assert_eq!(original_hh, marked_hh);

        // 更细层完全不动
        assert_eq!(pyramid.details[0].lh, marked.details[0].lh);
    }

    #[test]
    fn test_embed_multiplicative_formula() {
        // 图案已是最粗子带尺寸时不发生重采样，可逐系数核对公式
        let params = DwtParams::default();
        let embedder = DwtEmbedder::new(params.clone());
        let host = raster::gray_to_array(&create_test_gray(64, 64));
        let pattern = PatternGenerator::checkerboard(8, 8, 2).unwrap();

        let processor = DwtProcessor::new(params.levels);
        let pyramid = processor.decompose(host.view()).unwrap();
        let marked = embedder.embed_pattern(&pyramid, &pattern).unwrap();

        let signal = raster::normalize_signed(&pattern);
        for i in 0..8 {
            for j in 0..8 {
                let expected = pyramid.approx[[i, j]] * (1.0 + params.alpha * signal[[i, j]]);
                assert!((marked.approx[[i, j]] - expected).abs() < 1e-12);

                let d = pyramid.details.last().unwrap();
                let md = marked.details.last().unwrap();
                let expected_lh = d.lh[[i, j]]
                    * (1.0 + params.alpha * params.weights.horizontal * signal[[i, j]]);
                assert!((md.lh[[i, j]] - expected_lh).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_embed_distortion_is_small() {
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = create_test_gray(128, 128);
        let pattern = PatternGenerator::checkerboard(32, 32, 4).unwrap();

        let marked = embedder.embed(&host, &pattern).unwrap();

        // α = 0.01 时平均像素偏移应当很小（不可感知）
        let mut total = 0.0f64;
        for (p, q) in host.pixels().zip(marked.pixels()) {
            let diff = p[0] as f64 - q[0] as f64;
            total += diff * diff;
        }
        let mse = total / (128.0 * 128.0);
        assert!(mse < 16.0, "默认强度下失真应当很小, mse = {}", mse);
    }

    #[test]
    fn test_embed_invalid_params() {
        let mut params = DwtParams::default();
        params.alpha = 0.0;
        let embedder = DwtEmbedder::new(params);
        let host = create_test_gray(64, 64);
        let pattern = PatternGenerator::checkerboard(8, 8, 2).unwrap();
        assert!(embedder.embed(&host, &pattern).is_err());
    }

    #[test]
    fn test_embed_host_too_small() {
        // 4x4 在第 3 级前就缩到 1 像素
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = create_test_gray(4, 4);
        let pattern = PatternGenerator::checkerboard(8, 8, 2).unwrap();

        let result = embedder.embed(&host, &pattern);
        assert!(matches!(result, Err(WaveMarkError::InvalidDimension(_))));
    }

    #[test]
    fn test_embed_empty_pattern() {
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = raster::gray_to_array(&create_test_gray(64, 64));
        let pattern = GrayImage::new(0, 0);

        let processor = DwtProcessor::new(3);
        let pyramid = processor.decompose(host.view()).unwrap();
        assert!(embedder.embed_pattern(&pyramid, &pattern).is_err());
    }

    #[test]
    fn test_embed_with_smoothing_preserves_dimensions() {
        let mut params = DwtParams::default();
        params.smooth_output = true;
        let embedder = DwtEmbedder::new(params);
        let host = create_test_gray(64, 64);
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let marked = embedder.embed(&host, &pattern).unwrap();
        assert_eq!(marked.dimensions(), (64, 64));
    }

    #[test]
    fn test_embed_odd_dimensions() {
        // 奇数尺寸经 ceil 折半依然可用
        let embedder = DwtEmbedder::new(DwtParams::default());
        let host = create_test_gray(101, 77);
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let marked = embedder.embed(&host, &pattern).unwrap();
        assert_eq!(marked.dimensions(), (101, 77));
    }
}
