//! Data models for the spectrogram preparation pipeline
//!
//! - Sample sequences and fixed-length segments
//! - Log-mel spectral images
//! - Filename-derived class labels
//! - Per-segment, per-file and per-batch results

pub mod audio;
pub mod class_label;
pub mod results;
pub mod spectral_image;

pub use audio::{SampleSequence, Segment};
pub use class_label::ClassLabel;
pub use results::{BatchFailure, BatchReport, FileReport, ProcessingResult, RunSummary};
pub use spectral_image::{SpectralImage, MAX_DB, MIN_DB};
