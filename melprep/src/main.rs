//! melprep - Spectrogram dataset preparation
//!
//! Scans a data folder of `cat*` / `dog*` WAV recordings, cuts each into
//! fixed-length segments and writes one log-mel spectrogram PNG per segment
//! under `<data>/Processed/{Cats,Dogs}`, with per-class run logs in
//! `<data>/Processed/Report`.
//!
//! Exits non-zero only when setup fails (config, data folder, output tree).
//! File and batch failures are logged and summarized.

use anyhow::{Context, Result};
use clap::Parser;
use melprep::utils::SymphoniaDecoder;
use melprep_common::config::{self, TomlConfig, DATA_FOLDER_ENV};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for melprep
#[derive(Parser, Debug)]
#[command(name = "melprep")]
#[command(about = "Prepare log-mel spectrogram images from labelled WAV recordings")]
#[command(version)]
struct Args {
    /// Folder containing the WAV recordings
    #[arg(short, long, env = "MELPREP_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "MELPREP_CONFIG")]
    config: Option<PathBuf>,

    /// Number of batches processed concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Files per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Decode target sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Write the effective configuration to this path and exit
    #[arg(long, value_name = "FILE")]
    write_default_config: Option<PathBuf>,
}

impl Args {
    fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(workers) = self.workers {
            config.scheduler.workers = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.scheduler.batch_size = batch_size;
        }
        if let Some(sample_rate) = self.sample_rate {
            config.audio.sample_rate = sample_rate;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        TomlConfig::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting melprep v{} (rev {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("MELPREP_REVISION"),
        env!("MELPREP_BUILD_DATE")
    );

    if let Some(path) = &args.write_default_config {
        config::write_toml_config(&config, path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        info!("Configuration written to {}", path.display());
        return Ok(());
    }

    let data_folder =
        config::resolve_data_folder(args.data_folder.as_deref(), DATA_FOLDER_ENV, &config)?;
    info!("Data folder: {}", data_folder.display());

    let summary = melprep::run(&config, &data_folder, Arc::new(SymphoniaDecoder))
        .await
        .context("Run setup failed")?;

    info!(
        files = summary.files_processed(),
        successful = summary.successful_files(),
        file_errors = summary.file_errors(),
        unclassified = summary.unclassified_files(),
        images = summary.images_written(),
        skipped = summary.segments_skipped(),
        segment_errors = summary.segment_errors(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Run complete"
    );

    for failure in &summary.failed_batches {
        warn!(
            batch = failure.batch_index,
            files = failure.files.len(),
            error = %failure.message,
            "Batch did not complete"
        );
    }

    Ok(())
}
