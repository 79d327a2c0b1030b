use image::{imageops, GrayImage, Luma};
use ndarray::Array2;

/// 3x3 smoothing kernel: center-weighted box, normalized by 13
const SMOOTH_KERNEL: [f32; 9] = [
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    5.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
    1.0 / 13.0,
];

/// Convert an 8-bit grayscale image to an f64 grid (row-major, [rows, cols])
pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut data = Array2::zeros((height as usize, width as usize));
    for y in 0..height {
        for x in 0..width {
            data[[y as usize, x as usize]] = image.get_pixel(x, y)[0] as f64;
        }
    }
    data
}

/// Quantize an f64 grid back to 8-bit grayscale (round, clamp to [0, 255])
pub fn array_to_gray(data: &Array2<f64>) -> GrayImage {
    let (rows, cols) = data.dim();
    let mut image = GrayImage::new(cols as u32, rows as u32);
    for y in 0..rows {
        for x in 0..cols {
            let v = data[[y, x]].round().clamp(0.0, 255.0) as u8;
            image.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    image
}

/// Lanczos resample to the given size; a no-op when already there
pub fn resize_gray(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, imageops::FilterType::Lanczos3)
}

/// Map [0, 255] intensities onto the signed range [-1, 1]
pub fn normalize_signed(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut data = Array2::zeros((height as usize, width as usize));
    for y in 0..height {
        for x in 0..width {
            data[[y as usize, x as usize]] = image.get_pixel(x, y)[0] as f64 / 255.0 * 2.0 - 1.0;
        }
    }
    data
}

/// Run the 3x3 smoothing kernel over the image
pub fn smooth(image: &GrayImage) -> GrayImage {
    imageops::filter3x3(image, &SMOOTH_KERNEL)
}
