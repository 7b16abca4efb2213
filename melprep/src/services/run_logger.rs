//! Per-class run logs
//!
//! Three append-only text sinks (dog, cat, other) shared by every worker.
//! Each line is written with a single `write_all` while the sink's mutex is
//! held, so lines from concurrent files never interleave mid-line. Line order
//! across files is not defined.
//!
//! Skip lines name the full segment stem (`<file>_segment_<n>`) rather than
//! the bare segment number, so every line identifies its source file.

use crate::error::{LogError, SkipReason};
use crate::models::ClassLabel;
use melprep_common::OutputLayout;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One run log event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLine<'a> {
    /// Image written for a segment
    Processed { stem: &'a str },
    /// Segment rejected by a filter gate
    Skipped { stem: &'a str, reason: SkipReason },
    /// File or segment failure; `subject` is the file name or segment stem
    Error { subject: &'a str, message: &'a str },
    /// File matched neither class prefix
    Unclassified { name: &'a str },
}

impl fmt::Display for LogLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLine::Processed { stem } => write!(f, "Processed: {}", stem),
            LogLine::Skipped { stem, reason } => write!(f, "Skipping segment {} - {}", stem, reason),
            LogLine::Error { subject, message } => {
                write!(f, "Error processing {}: {}", subject, message)
            }
            LogLine::Unclassified { name } => {
                write!(f, "File does not match 'cat' or 'dog': {}", name)
            }
        }
    }
}

/// Append-only line sink backed by one file
#[derive(Debug)]
pub struct LogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl LogSink {
    /// Create or truncate the log file
    pub fn create(path: &Path) -> Result<Self, LogError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|source| LogError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    /// Append one complete line
    pub fn append(&self, line: &str) -> Result<(), LogError> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut file = self.file.lock().map_err(|_| LogError::Poisoned)?;
        file.write_all(buf.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The dog, cat and other sinks of one run
#[derive(Debug)]
pub struct RunLog {
    dog: LogSink,
    cat: LogSink,
    other: LogSink,
}

impl RunLog {
    /// Open (truncating) the three logs of a layout
    ///
    /// The report directory must already exist.
    pub fn create(layout: &OutputLayout) -> Result<Self, LogError> {
        Ok(Self {
            dog: LogSink::create(&layout.dog_log)?,
            cat: LogSink::create(&layout.cat_log)?,
            other: LogSink::create(&layout.other_log)?,
        })
    }

    pub fn sink(&self, label: ClassLabel) -> &LogSink {
        match label {
            ClassLabel::Dog => &self.dog,
            ClassLabel::Cat => &self.cat,
            ClassLabel::Other => &self.other,
        }
    }

    /// Append a line to the label's sink and mirror it to tracing
    ///
    /// A failing sink is reported through tracing only; processing continues.
    pub fn record(&self, label: ClassLabel, line: LogLine<'_>) {
        let text = line.to_string();

        match line {
            LogLine::Processed { .. } | LogLine::Unclassified { .. } => {
                tracing::info!(class = %label, "{}", text)
            }
            LogLine::Skipped { .. } => tracing::warn!(class = %label, "{}", text),
            LogLine::Error { .. } => tracing::error!(class = %label, "{}", text),
        }

        if let Err(e) = self.sink(label).append(&text) {
            tracing::error!(
                class = %label,
                log = %self.sink(label).path().display(),
                error = %e,
                "Run log append failed"
            );
        }
    }
}
