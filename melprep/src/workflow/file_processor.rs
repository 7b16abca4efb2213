//! Per-file processing chain
//!
//! classify → decode → segment → [silence gate → normalize → extract →
//! flatness gate → write image] per segment → run log
//!
//! Errors stop at the smallest unit that owns them: a decode failure ends
//! only its file, a write failure only its segment. A panic while handling
//! a file (symphonia can panic on malformed input) is caught at the file
//! boundary and logged like a decode failure, so the rest of the batch still
//! runs. Every outcome is written to the class log before the next segment
//! starts.

use crate::error::{ProcessError, SkipReason};
use crate::models::{ClassLabel, FileReport, ProcessingResult, SampleSequence, Segment};
use crate::services::image_writer::ImageWriter;
use crate::services::run_logger::{LogLine, RunLog};
use crate::services::segment_filter::{normalize, SegmentFilter};
use crate::services::segment_policy::{SegmentPolicies, SegmentPolicy};
use crate::services::FeatureExtractor;
use crate::utils::AudioDecoder;
use melprep_common::{OutputLayout, TomlConfig};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a worker needs to turn one file into images
///
/// Immutable after construction and shared across workers behind an `Arc`;
/// the run log sinks are the only shared mutable state.
pub struct FileProcessor {
    decoder: Arc<dyn AudioDecoder>,
    sample_rate: u32,
    policies: SegmentPolicies,
    filter: SegmentFilter,
    extractor: FeatureExtractor,
    writer: ImageWriter,
    layout: OutputLayout,
    run_log: RunLog,
}

impl FileProcessor {
    pub fn new(
        config: &TomlConfig,
        layout: OutputLayout,
        run_log: RunLog,
        decoder: Arc<dyn AudioDecoder>,
    ) -> Self {
        let sample_rate = config.audio.sample_rate;
        Self {
            decoder,
            sample_rate,
            policies: SegmentPolicies::from_config(&config.segmenting),
            filter: SegmentFilter::new(config.features.silence_threshold),
            extractor: FeatureExtractor::new(sample_rate, &config.features),
            writer: ImageWriter::new(config.output.image_width, config.output.image_height),
            layout,
            run_log,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Run every file of a batch in order
    pub fn process_batch(&self, batch_index: usize, files: &[PathBuf]) -> Vec<FileReport> {
        debug!(batch = batch_index, files = files.len(), "Batch started");
        files.iter().map(|path| self.process_file_isolated(path)).collect()
    }

    /// `process_file` with panics turned into a file-level error
    fn process_file_isolated(&self, path: &Path) -> FileReport {
        match catch_unwind(AssertUnwindSafe(|| self.process_file(path))) {
            Ok(report) => report,
            Err(payload) => {
                let file_name = file_stem(path);
                let label = ClassLabel::from_file_name(&file_name);
                let message = format!("panicked: {}", panic_message(payload.as_ref()));

                self.run_log.record(
                    label,
                    LogLine::Error {
                        subject: &file_name,
                        message: &message,
                    },
                );

                FileReport {
                    error: Some(message),
                    ..FileReport::new(file_name, label)
                }
            }
        }
    }

    /// Process one file; never fails, the report carries the outcome
    pub fn process_file(&self, path: &Path) -> FileReport {
        let file_name = file_stem(path);
        let label = ClassLabel::from_file_name(&file_name);
        let mut report = FileReport::new(file_name.clone(), label);

        let policy = match self.policies.for_label(label) {
            Some(policy) => policy,
            None => {
                self.run_log
                    .record(label, LogLine::Unclassified { name: &file_name });
                return report;
            }
        };

        match self.decode(path) {
            Ok(audio) => {
                report.segments = self.process_segments(label, policy, &audio, &file_name);
            }
            Err(e) => {
                let message = e.to_string();
                self.run_log.record(
                    label,
                    LogLine::Error {
                        subject: &file_name,
                        message: &message,
                    },
                );
                report.error = Some(message);
            }
        }

        report
    }

    fn decode(&self, path: &Path) -> Result<SampleSequence, ProcessError> {
        Ok(self.decoder.decode(path, self.sample_rate)?)
    }

    fn process_segments(
        &self,
        label: ClassLabel,
        policy: &dyn SegmentPolicy,
        audio: &SampleSequence,
        file_name: &str,
    ) -> Vec<ProcessingResult> {
        let segments = policy.segments(audio, file_name);

        debug!(
            file = file_name,
            class = %label,
            samples = audio.len(),
            duration_s = audio.duration_seconds(),
            segments = segments.len(),
            "Segmented"
        );

        if segments.is_empty() {
            warn!(file = file_name, "No segments produced (empty audio)");
        }

        segments
            .iter()
            .map(|segment| self.process_segment(label, segment))
            .collect()
    }

    /// Filter, extract, write and log one segment
    pub fn process_segment(&self, label: ClassLabel, segment: &Segment<'_>) -> ProcessingResult {
        let stem = segment.stem();
        let index = segment.index;

        let skip = |reason: SkipReason| {
            self.run_log.record(label, LogLine::Skipped { stem: &stem, reason });
            ProcessingResult::Skipped { index, reason }
        };

        let peak = match self.filter.check_signal(&segment.samples) {
            Ok(peak) => peak,
            Err(reason) => return skip(reason),
        };

        let normalized = normalize(&segment.samples, peak);

        let image = match self.extractor.extract(&normalized) {
            Ok(image) => image,
            Err(e) => return self.segment_error(label, &stem, index, e.to_string()),
        };

        if let Err(reason) = self.filter.check_image(&image) {
            return skip(reason);
        }

        match self.writer.write(&image, self.save_dir(label), &stem) {
            Ok(path) => {
                self.run_log.record(label, LogLine::Processed { stem: &stem });
                ProcessingResult::Image { index, path }
            }
            Err(e) => self.segment_error(label, &stem, index, e.to_string()),
        }
    }

    fn segment_error(
        &self,
        label: ClassLabel,
        stem: &str,
        index: usize,
        message: String,
    ) -> ProcessingResult {
        self.run_log.record(
            label,
            LogLine::Error {
                subject: stem,
                message: &message,
            },
        );
        ProcessingResult::Error { index, message }
    }

    fn save_dir(&self, label: ClassLabel) -> &Path {
        match label {
            ClassLabel::Cat => &self.layout.cat_dir,
            // Other never reaches segmentation
            ClassLabel::Dog | ClassLabel::Other => &self.layout.dog_dir,
        }
    }
}

/// Text of a panic payload (`&str` or `String`)
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// File name without directory or extension
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
