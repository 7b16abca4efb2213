//! melprep library interface
//!
//! Turns a folder of labelled WAV recordings into fixed-size log-mel
//! spectrogram images for training an audio classifier.
//!
//! Exposes public APIs for integration testing

pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::error::{DecodeError, FeatureError, LogError, ProcessError, SkipReason, WriteError};
pub use crate::models::{ClassLabel, FileReport, ProcessingResult, RunSummary};
pub use crate::workflow::{BatchScheduler, FileProcessor};

use melprep_common::{OutputLayout, TomlConfig};
use services::{FileScanner, RunLog};
use std::path::Path;
use std::sync::Arc;
use utils::AudioDecoder;

/// Run the whole pipeline over `data_folder`
///
/// Creates the output tree under the data folder, truncates the run logs,
/// scans for WAV files and processes them. Only setup failures are errors;
/// per-file and per-batch failures are reported in the summary.
pub async fn run(
    config: &TomlConfig,
    data_folder: &Path,
    decoder: Arc<dyn AudioDecoder>,
) -> anyhow::Result<RunSummary> {
    let layout = OutputLayout::under(data_folder, &config.output);
    layout.ensure_directories()?;

    let run_log = RunLog::create(&layout)?;

    let files = FileScanner::new().scan(data_folder)?;
    tracing::info!(
        data_folder = %data_folder.display(),
        files = files.len(),
        "Discovered WAV files"
    );

    let processor = Arc::new(FileProcessor::new(config, layout, run_log, decoder));
    let scheduler = BatchScheduler::new(processor, &config.scheduler);

    Ok(scheduler.run(files).await)
}
