//! Error types for melprep
//!
//! Failures are scoped to the smallest unit that owns them:
//! - `DecodeError` aborts one file
//! - `WriteError` and `FeatureError` abort one segment
//! - `SkipReason` is not a failure, only a logged rejection
//!
//! None of them stop a batch or the run.

use std::path::PathBuf;
use thiserror::Error;

/// Audio could not be turned into a sample sequence
#[derive(Debug, Error)]
pub enum DecodeError {
    /// File could not be opened
    #[error("Failed to open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Container probe or codec setup failed
    #[error("Unsupported or corrupt audio: {0}")]
    Unsupported(String),

    /// A packet failed to decode mid-stream
    #[error("Failed to decode packet: {0}")]
    Packet(String),

    /// Resampling to the target rate failed
    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// Spectrogram computation failed
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("FFT failed: {0}")]
    Fft(String),
}

/// Image could not be persisted
#[derive(Debug, Error)]
#[error("Failed to write {path}: {source}")]
pub struct WriteError {
    /// Segment stem the image belongs to
    pub stem: String,
    pub path: PathBuf,
    #[source]
    pub source: image::ImageError,
}

/// Run log sink failure
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to open log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to log: {0}")]
    Append(#[from] std::io::Error),

    /// Another writer panicked while holding the sink lock
    #[error("Log sink lock poisoned")]
    Poisoned,
}

/// File-level failure
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Why a segment was rejected before or after feature extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Peak amplitude below the silence threshold
    Silent,
    /// Every spectrogram value sits on the same clip boundary
    FlatSpectrogram,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Silent => write!(f, "silent"),
            SkipReason::FlatSpectrogram => write!(f, "flat spectrogram"),
        }
    }
}
