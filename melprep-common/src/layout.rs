//! Output directory layout
//!
//! Images land in `<base>/Processed/{Cats,Dogs}`, run logs in
//! `<base>/Processed/Report`. Directories are created once by the caller
//! before any worker starts.

use crate::config::OutputConfig;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolved output paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub cat_dir: PathBuf,
    pub dog_dir: PathBuf,
    pub report_dir: PathBuf,
    pub cat_log: PathBuf,
    pub dog_log: PathBuf,
    pub other_log: PathBuf,
}

impl OutputLayout {
    /// Compute the layout under a data folder
    pub fn under(base: &Path, output: &OutputConfig) -> Self {
        let processed = base.join("Processed");
        let report_dir = processed.join("Report");

        Self {
            cat_dir: processed.join("Cats"),
            dog_dir: processed.join("Dogs"),
            cat_log: report_dir.join(&output.cat_log_name),
            dog_log: report_dir.join(&output.dog_log_name),
            other_log: report_dir.join(&output.other_log_name),
            report_dir,
        }
    }

    /// Create the image and report directories (idempotent)
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.cat_dir, &self.dog_dir, &self.report_dir] {
            std::fs::create_dir_all(dir)?;
            info!(path = %dir.display(), "Output directory ready");
        }
        Ok(())
    }
}
