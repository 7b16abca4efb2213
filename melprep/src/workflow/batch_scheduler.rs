//! Batch scheduling
//!
//! Files are partitioned into fixed-size batches in discovery order. Each
//! batch runs on the blocking pool (the work is CPU-bound), at most
//! `workers` batches at a time via `buffer_unordered`. Panics inside a file
//! are caught by `FileProcessor`; one that still escapes its batch task is
//! reported as a `BatchFailure` and every other batch runs to completion.

use crate::models::{BatchFailure, BatchReport, RunSummary};
use crate::workflow::file_processor::{panic_message, FileProcessor};
use futures::stream::{self, StreamExt};
use melprep_common::config::SchedulerConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::{error, info};

/// Bounded-parallel batch runner
pub struct BatchScheduler {
    processor: Arc<FileProcessor>,
    batch_size: usize,
    workers: usize,
}

impl BatchScheduler {
    pub fn new(processor: Arc<FileProcessor>, config: &SchedulerConfig) -> Self {
        Self {
            processor,
            batch_size: config.batch_size.max(1),
            workers: config.workers.max(1),
        }
    }

    /// Process every file and wait for all batches
    ///
    /// Never fails: per-file errors live in the file reports and panicked
    /// batches in `failed_batches`.
    pub async fn run(&self, files: Vec<PathBuf>) -> RunSummary {
        let start_time = Instant::now();
        let total_files = files.len();
        let batches = partition(files, self.batch_size);
        let total_batches = batches.len();

        info!(
            files = total_files,
            batches = total_batches,
            batch_size = self.batch_size,
            workers = self.workers,
            "Scheduling batches"
        );

        let batches_done = Arc::new(AtomicUsize::new(0));

        let outcomes: Vec<(usize, Vec<PathBuf>, Result<BatchReport, JoinError>)> =
            stream::iter(batches.into_iter().enumerate())
                .map(|(batch_index, batch)| {
                    let processor = Arc::clone(&self.processor);
                    let batches_done = Arc::clone(&batches_done);

                    async move {
                        let files = batch.clone();
                        let result = tokio::task::spawn_blocking(move || BatchReport {
                            batch_index,
                            files: processor.process_batch(batch_index, &batch),
                        })
                        .await;

                        let done = batches_done.fetch_add(1, Ordering::SeqCst) + 1;
                        info!(
                            batch = batch_index,
                            progress = %format!("{}/{}", done, total_batches),
                            "Batch finished"
                        );

                        (batch_index, files, result)
                    }
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;

        let mut summary = RunSummary::default();

        for (batch_index, files, result) in outcomes {
            match result {
                Ok(report) => summary.batches.push(report),
                Err(e) => {
                    let message = join_error_message(e);
                    error!(
                        batch = batch_index,
                        files = files.len(),
                        error = %message,
                        "Batch failed"
                    );
                    summary.failed_batches.push(BatchFailure {
                        batch_index,
                        files,
                        message,
                    });
                }
            }
        }

        summary.batches.sort_by_key(|b| b.batch_index);
        summary.failed_batches.sort_by_key(|b| b.batch_index);
        summary.elapsed = start_time.elapsed();
        summary
    }
}

/// Consecutive chunks of `batch_size` in input order; the last may be short
pub fn partition(files: Vec<PathBuf>, batch_size: usize) -> Vec<Vec<PathBuf>> {
    files
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

fn join_error_message(e: JoinError) -> String {
    if e.is_panic() {
        format!("worker panicked: {}", panic_message(e.into_panic().as_ref()))
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("dog_{}.wav", i))).collect()
    }

    #[test]
    fn test_partition_sizes() {
        let batches = partition(paths(25), 10);
        let sizes: Vec<_> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[test]
    fn test_partition_keeps_order() {
        let batches = partition(paths(5), 2);
        let flat: Vec<_> = batches.into_iter().flatten().collect();
        assert_eq!(flat, paths(5));
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(Vec::new(), 10).is_empty());
    }
}
