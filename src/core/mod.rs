// Watermarking engine modules
pub mod detector;
pub mod dwt;
pub mod embedder;
pub mod extractor;
pub mod file_ops;
pub mod lsb;
pub mod pattern;
pub mod raster;

pub use detector::{Detection, WatermarkDetector};
pub use dwt::{DwtProcessor, WaveletPyramid};
pub use embedder::DwtEmbedder;
pub use extractor::DwtExtractor;
pub use lsb::LsbWatermarker;
pub use pattern::PatternGenerator;
