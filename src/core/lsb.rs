use image::{GrayImage, Luma};

use crate::core::raster;
use crate::models::WaveMarkError;

/// 空域 LSB（最低有效位）水印
///
/// ## 算法
///
/// 嵌入：水印图案重采样到宿主尺寸，按 128 阈值二值化，
/// 写入每个像素的最低位：`p' = (p & 0xFE) | bit`。
/// 提取：读出最低位平面 `(p & 1) · 255`，重采样到目标尺寸。
///
/// 提取无需原图参照，但最低位对任何重新量化（有损压缩、滤波）都极其
/// 脆弱，仅适用于无损存储的场景。
pub struct LsbWatermarker;

impl LsbWatermarker {
    /// 将二值化图案写入宿主图的最低位平面
    pub fn embed(host: &GrayImage, pattern: &GrayImage) -> Result<GrayImage, WaveMarkError> {
        let (width, height) = host.dimensions();
        if width == 0 || height == 0 {
            return Err(WaveMarkError::InvalidDimension(
                "Host image is empty".to_string(),
            ));
        }
        if pattern.width() == 0 || pattern.height() == 0 {
            return Err(WaveMarkError::InvalidDimension(
                "Watermark pattern is empty".to_string(),
            ));
        }

        let resized = raster::resize_gray(pattern, width, height);
        let mut result = host.clone();
        for y in 0..height {
            for x in 0..width {
                let bit = if resized.get_pixel(x, y)[0] > 128 { 1 } else { 0 };
                let p = result.get_pixel(x, y)[0];
                result.put_pixel(x, y, Luma([(p & 0xFE) | bit]));
            }
        }
        Ok(result)
    }

    /// 读取最低位平面并重采样到目标尺寸
    pub fn extract(
        image: &GrayImage,
        target_size: (u32, u32),
    ) -> Result<GrayImage, WaveMarkError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(WaveMarkError::InvalidDimension(
                "Image is empty".to_string(),
            ));
        }
        if target_size.0 == 0 || target_size.1 == 0 {
            return Err(WaveMarkError::InvalidDimension(format!(
                "Target pattern size must be nonzero, got {:?}",
                target_size
            )));
        }

        let mut plane = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let bit = image.get_pixel(x, y)[0] & 1;
                plane.put_pixel(x, y, Luma([bit * 255]));
            }
        }
        Ok(raster::resize_gray(&plane, target_size.0, target_size.1))
    }
}
