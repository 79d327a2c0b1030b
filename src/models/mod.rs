pub mod config;
pub mod error;
pub mod task;

// Re-export commonly used types
pub use config::{Algorithm, DetectorParams, DwtParams, SubbandWeights};
pub use error::WaveMarkError;
pub use task::ImageFile;
