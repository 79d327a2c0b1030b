use image::{open, GrayImage};
use log::info;
use rayon::prelude::*;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::models::{Algorithm, DwtParams, ImageFile, WaveMarkError};

/// Parallel processor for batch watermarking
///
/// Uses Rayon for CPU-bound parallel processing of images.
pub struct ParallelProcessor {
    thread_count: usize,
}

impl ParallelProcessor {
    /// Create a new parallel processor
    ///
    /// Uses all available CPU cores by default
    pub fn new() -> Self {
        Self {
            thread_count: num_cpus::get(),
        }
    }

    /// Create a parallel processor with custom thread count
    pub fn with_threads(thread_count: usize) -> Self {
        Self { thread_count }
    }

    /// Embed one shared pattern into a batch of images in parallel
    ///
    /// # Arguments
    /// * `images`     - List of images to process (from `FileScanner`)
    /// * `pattern`    - Watermark pattern shared by the whole batch
    /// * `algorithm`  - Embedding scheme
    /// * `params`     - DWT parameters (the LSB scheme ignores them)
    /// * `output_dir` - Output directory; relative paths are mirrored into it
    ///
    /// # Returns
    /// * Number of successfully processed images
    pub fn process_batch(
        &self,
        images: &[ImageFile],
        pattern: &GrayImage,
        algorithm: Algorithm,
        params: &DwtParams,
        output_dir: &Path,
    ) -> Result<usize, WaveMarkError> {
        let total_files = images.len();
        let processed_count = Arc::new(Mutex::new(0usize));

        // Configure Rayon thread pool
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.thread_count)
            .build()
            .map_err(|e| {
                WaveMarkError::ImageProcessing(format!("Failed to create thread pool: {}", e))
            })?
            .install(|| {
                images.par_iter().try_for_each(|image_file| {
                    let output_path = output_dir.join(&image_file.relative_path);
                    if let Some(parent) = output_path.parent() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            WaveMarkError::ImageProcessing(format!(
                                "Failed to create output directory: {}",
                                e
                            ))
                        })?;
                    }

                    // Both schemes need lossless storage to survive, so JPEG
                    // inputs are copied as-is without watermarking.
                    let is_jpeg = output_path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(|e| e.to_lowercase())
                        .map(|e| e == "jpg" || e == "jpeg")
                        .unwrap_or(false);

                    if is_jpeg {
                        std::fs::copy(&image_file.source_path, &output_path).map_err(|e| {
                            WaveMarkError::ImageProcessing(format!(
                                "Failed to copy {}: {}",
                                image_file.relative_path, e
                            ))
                        })?;
                    } else {
                        let host = open(&image_file.source_path)
                            .map_err(|e| {
                                WaveMarkError::ImageProcessing(format!(
                                    "Failed to load {}: {}",
                                    image_file.relative_path, e
                                ))
                            })?
                            .to_luma8();
                        let watermarked = crate::embed(&host, pattern, algorithm, params)?;
                        watermarked.save(&output_path).map_err(|e| {
                            WaveMarkError::ImageProcessing(format!(
                                "Failed to save {}: {}",
                                output_path.display(),
                                e
                            ))
                        })?;
                    }

                    // Completed count is 1-based and monotonically increasing
                    let completed = {
                        let mut count = processed_count.lock().unwrap_or_else(|e| e.into_inner());
                        *count += 1;
                        *count
                    };
                    info!(
                        "[{}/{}] {}",
                        completed, total_files, image_file.relative_path
                    );

                    Ok::<(), WaveMarkError>(())
                })
            })?;

        let final_count = *processed_count.lock().unwrap_or_else(|e| e.into_inner());
        Ok(final_count)
    }

    /// Get configured thread count
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pattern::PatternGenerator;
    use image::Luma;
    use tempfile::TempDir;

    fn create_test_image(path: &std::path::Path, width: u32, height: u32) {
        let img = GrayImage::from_fn(width, height, |x, y| Luma([((x * 5 + y * 3) % 256) as u8]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_parallel_processor_creation() {
        let processor = ParallelProcessor::new();
        assert!(processor.thread_count() > 0);

        let custom_processor = ParallelProcessor::with_threads(4);
        assert_eq!(custom_processor.thread_count(), 4);
    }

    #[test]
    fn test_process_batch_mirrors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        std::fs::create_dir_all(temp_dir.path().join("sub")).unwrap();
        let img1_path = temp_dir.path().join("img1.png");
        let img2_path = temp_dir.path().join("sub/img2.png");
        create_test_image(&img1_path, 64, 64);
        create_test_image(&img2_path, 64, 64);

        let images = vec![
            ImageFile::new("img1.png".to_string(), img1_path),
            ImageFile::new("sub/img2.png".to_string(), img2_path),
        ];
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let processor = ParallelProcessor::with_threads(2);
        let result = processor.process_batch(
            &images,
            &pattern,
            Algorithm::Dwt,
            &DwtParams::default(),
            output_dir.path(),
        );

        assert!(result.is_ok(), "batch should succeed: {:?}", result.err());
        assert_eq!(result.unwrap(), 2);
        assert!(output_dir.path().join("img1.png").exists());
        assert!(output_dir.path().join("sub/img2.png").exists());
    }

    #[test]
    fn test_process_batch_embeds_watermark() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let img_path = temp_dir.path().join("img.png");
        create_test_image(&img_path, 64, 64);
        let images = vec![ImageFile::new("img.png".to_string(), img_path.clone())];
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let processor = ParallelProcessor::with_threads(1);
        processor
            .process_batch(
                &images,
                &pattern,
                Algorithm::Lsb,
                &DwtParams::default(),
                output_dir.path(),
            )
            .unwrap();

        let original = image::open(&img_path).unwrap().to_luma8();
        let marked = image::open(output_dir.path().join("img.png"))
            .unwrap()
            .to_luma8();
        assert_eq!(original.dimensions(), marked.dimensions());
        assert!(
            original.as_raw() != marked.as_raw(),
            "output should differ from input"
        );
    }

    #[test]
    fn test_process_batch_jpeg_copied_as_is() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        let png_path = temp_dir.path().join("src.png");
        create_test_image(&png_path, 64, 64);
        let jpg_path = temp_dir.path().join("img1.jpg");
        image::open(&png_path).unwrap().save(&jpg_path).unwrap();

        let images = vec![ImageFile::new("img1.jpg".to_string(), jpg_path.clone())];
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let processor = ParallelProcessor::with_threads(1);
        let result = processor.process_batch(
            &images,
            &pattern,
            Algorithm::Dwt,
            &DwtParams::default(),
            output_dir.path(),
        );

        assert!(result.is_ok(), "JPEG batch should succeed: {:?}", result.err());
        let copied = std::fs::read(output_dir.path().join("img1.jpg")).unwrap();
        let source = std::fs::read(&jpg_path).unwrap();
        assert_eq!(copied, source, "JPEG should be copied byte-for-byte");
    }

    #[test]
    fn test_process_batch_missing_file_fails() {
        let output_dir = TempDir::new().unwrap();
        let images = vec![ImageFile::new(
            "gone.png".to_string(),
            std::path::PathBuf::from("/nonexistent/gone.png"),
        )];
        let pattern = PatternGenerator::checkerboard(16, 16, 4).unwrap();

        let processor = ParallelProcessor::with_threads(1);
        let result = processor.process_batch(
            &images,
            &pattern,
            Algorithm::Dwt,
            &DwtParams::default(),
            output_dir.path(),
        );
        assert!(result.is_err());
    }
}
