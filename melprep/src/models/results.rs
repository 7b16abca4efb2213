//! Per-segment, per-file and per-batch outcomes

use super::ClassLabel;
use crate::error::SkipReason;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one segment attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    /// Spectrogram image written
    Image { index: usize, path: PathBuf },
    /// Rejected by the segment filter
    Skipped { index: usize, reason: SkipReason },
    /// Feature extraction or image write failed
    Error { index: usize, message: String },
}

impl ProcessingResult {
    pub fn index(&self) -> usize {
        match self {
            ProcessingResult::Image { index, .. }
            | ProcessingResult::Skipped { index, .. }
            | ProcessingResult::Error { index, .. } => *index,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ProcessingResult::Image { .. })
    }
}

/// Everything that happened to one input file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file_name: String,
    pub label: ClassLabel,
    /// Segment outcomes in emission order
    pub segments: Vec<ProcessingResult>,
    /// File-level failure (decode); no segments were attempted
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(file_name: impl Into<String>, label: ClassLabel) -> Self {
        Self {
            file_name: file_name.into(),
            label,
            segments: Vec::new(),
            error: None,
        }
    }

    pub fn images_written(&self) -> usize {
        self.segments.iter().filter(|r| r.is_image()).count()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.label != ClassLabel::Other
    }
}

/// File reports of one batch that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub batch_index: usize,
    pub files: Vec<FileReport>,
}

/// Batch whose task panicked; its remaining files were not processed
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub files: Vec<PathBuf>,
    pub message: String,
}

/// Aggregate of a whole scheduler run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Completed batches, ordered by batch index
    pub batches: Vec<BatchReport>,
    /// Failed batches, ordered by batch index
    pub failed_batches: Vec<BatchFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn files(&self) -> impl Iterator<Item = &FileReport> {
        self.batches.iter().flat_map(|b| b.files.iter())
    }

    fn segments(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.files().flat_map(|f| f.segments.iter())
    }

    pub fn files_processed(&self) -> usize {
        self.files().count()
    }

    pub fn successful_files(&self) -> usize {
        self.files().filter(|f| f.is_success()).count()
    }

    pub fn file_errors(&self) -> usize {
        self.files().filter(|f| f.error.is_some()).count()
    }

    pub fn unclassified_files(&self) -> usize {
        self.files().filter(|f| f.label == ClassLabel::Other).count()
    }

    pub fn images_written(&self) -> usize {
        self.segments().filter(|r| r.is_image()).count()
    }

    pub fn segments_skipped(&self) -> usize {
        self.segments()
            .filter(|r| matches!(r, ProcessingResult::Skipped { .. }))
            .count()
    }

    pub fn segment_errors(&self) -> usize {
        self.segments()
            .filter(|r| matches!(r, ProcessingResult::Error { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog_report(results: Vec<ProcessingResult>) -> FileReport {
        FileReport {
            segments: results,
            ..FileReport::new("dog_1", ClassLabel::Dog)
        }
    }

    #[test]
    fn test_summary_counters() {
        let mut failed = FileReport::new("cat_broken", ClassLabel::Cat);
        failed.error = Some("Unsupported or corrupt audio".to_string());

        let summary = RunSummary {
            batches: vec![BatchReport {
                batch_index: 0,
                files: vec![
                    dog_report(vec![
                        ProcessingResult::Image {
                            index: 0,
                            path: PathBuf::from("a.png"),
                        },
                        ProcessingResult::Skipped {
                            index: 1,
                            reason: SkipReason::Silent,
                        },
                        ProcessingResult::Error {
                            index: 2,
                            message: "disk full".to_string(),
                        },
                    ]),
                    failed,
                    FileReport::new("bird", ClassLabel::Other),
                ],
            }],
            ..Default::default()
        };

        assert_eq!(summary.files_processed(), 3);
        assert_eq!(summary.successful_files(), 1);
        assert_eq!(summary.file_errors(), 1);
        assert_eq!(summary.unclassified_files(), 1);
        assert_eq!(summary.images_written(), 1);
        assert_eq!(summary.segments_skipped(), 1);
        assert_eq!(summary.segment_errors(), 1);
    }

    #[test]
    fn test_result_index() {
        let result = ProcessingResult::Skipped {
            index: 7,
            reason: SkipReason::FlatSpectrogram,
        };
        assert_eq!(result.index(), 7);
        assert!(!result.is_image());
    }
}
