use thiserror::Error;

/// Custom error types for the WaveMark engine
#[derive(Error, Debug)]
pub enum WaveMarkError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimension(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Missing reference image: {0}")]
    MissingReference(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
