use std::path::PathBuf;

/// An image discovered by a batch scan
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// Path relative to the scan root (preserves hierarchy in the output tree)
    pub relative_path: String,
    /// Absolute location on disk
    pub source_path: PathBuf,
}

impl ImageFile {
    pub fn new(relative_path: String, source_path: PathBuf) -> Self {
        Self {
            relative_path,
            source_path,
        }
    }
}
