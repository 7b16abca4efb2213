//! Pipeline components
//!
//! Leaves of the per-file chain: discovery, segmentation, filtering,
//! feature extraction, image output and run logging.

pub mod feature_extractor;
pub mod file_scanner;
pub mod image_writer;
pub mod run_logger;
pub mod segment_filter;
pub mod segment_policy;

pub use feature_extractor::FeatureExtractor;
pub use file_scanner::{FileScanner, ScanError};
pub use image_writer::ImageWriter;
pub use run_logger::{LogLine, LogSink, RunLog};
pub use segment_filter::SegmentFilter;
pub use segment_policy::{CatPolicy, DogPolicy, SegmentPolicies, SegmentPolicy};
