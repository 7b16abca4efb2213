//! Run orchestration
//!
//! `FileProcessor` carries one file through the whole chain;
//! `BatchScheduler` fans batches of files out over the worker pool.

pub mod batch_scheduler;
pub mod file_processor;

pub use batch_scheduler::BatchScheduler;
pub use file_processor::FileProcessor;
