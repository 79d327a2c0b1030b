use crate::models::ImageFile;
use std::path::Path;
use walkdir::WalkDir;

/// Recursive file scanner for finding supported images
///
/// Scans directories recursively and filters for PNG/JPEG/JPG files.
/// Maintains relative paths for preserving directory hierarchy.
pub struct FileScanner {
    supported_extensions: Vec<&'static str>,
}

impl FileScanner {
    /// Create a new file scanner with default supported formats (PNG, JPEG, JPG)
    pub fn new() -> Self {
        Self {
            supported_extensions: vec!["png", "jpg", "jpeg"],
        }
    }

    /// Create a file scanner with custom supported extensions
    pub fn with_extensions(extensions: Vec<&'static str>) -> Self {
        Self {
            supported_extensions: extensions,
        }
    }

    /// Scan a directory recursively for supported image files
    ///
    /// # Arguments
    /// * `root_path` - Root directory to scan
    ///
    /// # Returns
    /// * Vector of `ImageFile` sorted by relative path, so batch runs and
    ///   their logs are reproducible
    pub fn scan(&self, root_path: &Path) -> Result<Vec<ImageFile>, std::io::Error> {
        let mut images = Vec::new();

        // Walk directory tree
        for entry in WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            // Skip directories
            if !path.is_file() {
                continue;
            }

            if self.is_supported(path) {
                let relative_path = path.strip_prefix(root_path).map_err(|e| {
                    std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Failed to calculate relative path: {}", e),
                    )
                })?;

                images.push(ImageFile::new(
                    relative_path.to_string_lossy().to_string(),
                    path.to_path_buf(),
                ));
            }
        }

        // Sort by relative path for consistent ordering
        images.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        Ok(images)
    }

    /// Count total number of supported images in a directory
    pub fn count_images(&self, root_path: &Path) -> Result<usize, std::io::Error> {
        Ok(self.scan(root_path)?.len())
    }

    /// Check if a file is a supported image based on extension
    pub fn is_supported(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            self.supported_extensions.contains(&ext_str.as_str())
        } else {
            false
        }
    }

    /// Get list of supported extensions
    pub fn supported_extensions(&self) -> &[&'static str] {
        &self.supported_extensions
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_structure() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path();

        fs::create_dir_all(base.join("images/photos")).unwrap();
        fs::create_dir_all(base.join("documents")).unwrap();

        fs::write(base.join("image1.png"), b"fake png").unwrap();
        fs::write(base.join("image2.jpg"), b"fake jpg").unwrap();
        fs::write(base.join("image3.JPEG"), b"fake jpeg").unwrap();
        fs::write(base.join("images/photo.png"), b"photo").unwrap();
        fs::write(base.join("images/photos/vacation.jpg"), b"vacation").unwrap();

        // Non-image files (should be ignored)
        fs::write(base.join("readme.txt"), b"text file").unwrap();
        fs::write(base.join("data.json"), b"{}").unwrap();
        fs::write(base.join("documents/report.pdf"), b"pdf").unwrap();

        temp_dir
    }

    #[test]
    fn test_scan_finds_all_images() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        assert_eq!(images.len(), 5);
    }

    #[test]
    fn test_scan_sorts_by_path() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        for i in 0..images.len() - 1 {
            assert!(images[i].relative_path <= images[i + 1].relative_path);
        }
    }

    #[test]
    fn test_scan_preserves_relative_paths() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        let vacation = images
            .iter()
            .find(|img| img.relative_path.contains("vacation.jpg"))
            .expect("Should find vacation.jpg");

        assert!(vacation.relative_path.contains("images"));
        assert!(vacation.relative_path.contains("photos"));
    }

    #[test]
    fn test_scan_case_insensitive_extensions() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        let has_uppercase = images
            .iter()
            .any(|img| img.source_path.to_string_lossy().contains(".JPEG"));
        assert!(has_uppercase, "Should handle uppercase extensions");
    }

    #[test]
    fn test_scan_ignores_non_images() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        for image in &images {
            let path_str = image.source_path.to_string_lossy();
            assert!(!path_str.ends_with(".txt"));
            assert!(!path_str.ends_with(".json"));
            assert!(!path_str.ends_with(".pdf"));
        }
    }

    #[test]
    fn test_count_images() {
        let temp_dir = create_test_structure();
        let scanner = FileScanner::new();

        let count = scanner.count_images(temp_dir.path()).unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_is_supported() {
        let scanner = FileScanner::new();

        assert!(scanner.is_supported(Path::new("image.png")));
        assert!(scanner.is_supported(Path::new("photo.jpg")));
        assert!(scanner.is_supported(Path::new("pic.JPEG")));
        assert!(!scanner.is_supported(Path::new("document.pdf")));
        assert!(!scanner.is_supported(Path::new("no_extension")));
    }

    #[test]
    fn test_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("image.gif"), b"gif").unwrap();
        fs::write(temp_dir.path().join("image.webp"), b"webp").unwrap();
        fs::write(temp_dir.path().join("image.png"), b"png").unwrap();

        let scanner = FileScanner::with_extensions(vec!["gif", "webp"]);
        let images = scanner.scan(temp_dir.path()).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = FileScanner::new();

        let images = scanner.scan(temp_dir.path()).unwrap();
        assert_eq!(images.len(), 0);
    }
}
