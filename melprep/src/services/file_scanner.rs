//! Recording discovery
//!
//! Lists the `.wav` files sitting directly in the data folder. The walk is
//! one level deep, so the `Processed/` output tree is never picked up again.
//! Content is not sniffed: a corrupt file must still reach the decoder and
//! produce its own error line.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Recording file scanner
pub struct FileScanner {
    extensions: Vec<String>,
}

impl FileScanner {
    /// Scanner accepting `.wav` (case-insensitive)
    pub fn new() -> Self {
        Self {
            extensions: vec!["wav".to_string()],
        }
    }

    /// Scan the folder, returning matching files sorted by path
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(root_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_accepted_extension(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    // Continue scanning, don't abort
                }
            }
        }

        tracing::debug!(
            folder = %root_path.display(),
            count = files.len(),
            "Recording scan complete"
        );

        Ok(files)
    }

    fn has_accepted_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.extensions.iter().any(|accepted| *accepted == ext))
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
