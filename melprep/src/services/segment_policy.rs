//! Class-specific segmentation
//!
//! Every policy emits segments of exactly `target_length` samples, padding
//! short input by circular repetition of the audio itself (never zeros).
//!
//! - Dog: sliding windows advancing by the overlap length
//! - Cat: contiguous tiles, the tail wrapped around onto the prefix

use crate::models::{ClassLabel, SampleSequence, Segment};
use melprep_common::config::SegmentingConfig;

/// Turns one sample sequence into ordered fixed-length segments
pub trait SegmentPolicy: Send + Sync {
    /// Segment length in samples at the given rate
    fn target_length(&self, sample_rate: u32) -> usize;

    /// Segments in emission order, indices starting at 0
    fn segments<'a>(&self, audio: &'a SampleSequence, file_name: &'a str) -> Vec<Segment<'a>>;
}

/// Dense overlapping windows for short bursty sounds
#[derive(Debug, Clone, PartialEq)]
pub struct DogPolicy {
    pub window_seconds: f64,
    /// Distance between successive window starts
    pub overlap_seconds: f64,
}

impl DogPolicy {
    pub fn new(window_seconds: f64, overlap_seconds: f64) -> Self {
        Self {
            window_seconds,
            overlap_seconds,
        }
    }
}

impl SegmentPolicy for DogPolicy {
    fn target_length(&self, sample_rate: u32) -> usize {
        (self.window_seconds * sample_rate as f64) as usize
    }

    fn segments<'a>(&self, audio: &'a SampleSequence, file_name: &'a str) -> Vec<Segment<'a>> {
        let target_length = audio.seconds_to_samples(self.window_seconds);
        let overlap_size = audio.seconds_to_samples(self.overlap_seconds);
        sliding_windows(file_name, audio.samples(), target_length, overlap_size)
    }
}

/// Non-overlapping tiles for steady sounds
#[derive(Debug, Clone, PartialEq)]
pub struct CatPolicy {
    pub window_seconds: f64,
}

impl CatPolicy {
    pub fn new(window_seconds: f64) -> Self {
        Self { window_seconds }
    }
}

impl SegmentPolicy for CatPolicy {
    fn target_length(&self, sample_rate: u32) -> usize {
        (self.window_seconds * sample_rate as f64) as usize
    }

    fn segments<'a>(&self, audio: &'a SampleSequence, file_name: &'a str) -> Vec<Segment<'a>> {
        let target_length = audio.seconds_to_samples(self.window_seconds);
        tiles(file_name, audio.samples(), target_length)
    }
}

/// The policies of the classes that get segmented
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPolicies {
    pub dog: DogPolicy,
    pub cat: CatPolicy,
}

impl SegmentPolicies {
    pub fn from_config(config: &SegmentingConfig) -> Self {
        Self {
            dog: DogPolicy::new(config.dog_window_seconds, config.dog_overlap_seconds),
            cat: CatPolicy::new(config.cat_window_seconds),
        }
    }

    /// `None` for unclassified files, which are never segmented
    pub fn for_label(&self, label: ClassLabel) -> Option<&dyn SegmentPolicy> {
        match label {
            ClassLabel::Dog => Some(&self.dog),
            ClassLabel::Cat => Some(&self.cat),
            ClassLabel::Other => None,
        }
    }
}

impl Default for SegmentPolicies {
    fn default() -> Self {
        Self::from_config(&SegmentingConfig::default())
    }
}

/// Tile `samples` end-to-end until `target_length`, truncating the last tile
///
/// Empty input yields an empty vector.
pub fn circular_pad(samples: &[f32], target_length: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    samples
        .iter()
        .copied()
        .cycle()
        .take(target_length)
        .collect()
}

/// Windows of `target_length` starting at 0, advancing by `step`, while the
/// window fits; input shorter than one window becomes a single circularly
/// padded segment.
///
/// Consecutive windows share `target_length - step` samples.
pub fn sliding_windows<'a>(
    file_name: &'a str,
    samples: &'a [f32],
    target_length: usize,
    step: usize,
) -> Vec<Segment<'a>> {
    let total_length = samples.len();

    if total_length == 0 || target_length == 0 {
        return Vec::new();
    }

    if total_length < target_length {
        return vec![Segment::owned(
            file_name,
            0,
            circular_pad(samples, target_length),
        )];
    }

    // A zero step would never advance
    let step = step.max(1);

    let mut segments = Vec::with_capacity((total_length - target_length) / step + 1);
    let mut start = 0;
    while start + target_length <= total_length {
        segments.push(Segment::borrowed(
            file_name,
            segments.len(),
            &samples[start..start + target_length],
        ));
        start += step;
    }
    segments
}

/// Contiguous tiles of `target_length`; a partial tail is completed with the
/// audio's own prefix, and input shorter than one tile is circularly padded.
pub fn tiles<'a>(file_name: &'a str, samples: &'a [f32], target_length: usize) -> Vec<Segment<'a>> {
    let total_length = samples.len();

    if total_length == 0 || target_length == 0 {
        return Vec::new();
    }

    if total_length < target_length {
        return vec![Segment::owned(
            file_name,
            0,
            circular_pad(samples, target_length),
        )];
    }

    let mut chunks = samples.chunks_exact(target_length);
    let mut segments: Vec<Segment<'a>> = chunks
        .by_ref()
        .enumerate()
        .map(|(index, chunk)| Segment::borrowed(file_name, index, chunk))
        .collect();

    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        // total_length >= target_length, so the prefix is long enough
        let wrap = target_length - remainder.len();
        let mut tail = Vec::with_capacity(target_length);
        tail.extend_from_slice(remainder);
        tail.extend_from_slice(&samples[..wrap]);
        segments.push(Segment::owned(file_name, segments.len(), tail));
    }

    segments
}
