//! Decoded audio and the segments cut from it

use std::borrow::Cow;

/// Mono samples at a fixed sample rate
///
/// Owned by the task processing one file; never mutated after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSequence {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleSequence {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Number of samples covering `seconds` at this rate (truncating)
    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        (seconds * self.sample_rate as f64) as usize
    }
}

/// Fixed-length slice of a sample sequence tagged with its provenance
///
/// Windows that fit inside the source borrow it; padded segments own their
/// synthesized samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub file_name: &'a str,
    /// Zero-based emission index
    pub index: usize,
    pub samples: Cow<'a, [f32]>,
}

impl<'a> Segment<'a> {
    pub fn borrowed(file_name: &'a str, index: usize, samples: &'a [f32]) -> Self {
        Self {
            file_name,
            index,
            samples: Cow::Borrowed(samples),
        }
    }

    pub fn owned(file_name: &'a str, index: usize, samples: Vec<f32>) -> Self {
        Self {
            file_name,
            index,
            samples: Cow::Owned(samples),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Output stem: `{file_name}_segment_{index+1}`
    pub fn stem(&self) -> String {
        format!("{}_segment_{}", self.file_name, self.index + 1)
    }
}
