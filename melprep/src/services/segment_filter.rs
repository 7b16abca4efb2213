//! Degenerate segment rejection
//!
//! Two gates around feature extraction:
//! - before: peak amplitude below the silence threshold
//! - after: a spectrogram pinned entirely to one clip boundary

use crate::error::SkipReason;
use crate::models::SpectralImage;

/// Silence and dynamic-range gates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentFilter {
    silence_threshold: f32,
}

impl SegmentFilter {
    pub fn new(silence_threshold: f32) -> Self {
        Self { silence_threshold }
    }

    /// Silence gate; returns the peak amplitude for normalization
    pub fn check_signal(&self, samples: &[f32]) -> Result<f32, SkipReason> {
        let peak = peak_amplitude(samples);
        if peak < self.silence_threshold {
            return Err(SkipReason::Silent);
        }
        Ok(peak)
    }

    /// Dynamic-range gate
    pub fn check_image(&self, image: &SpectralImage) -> Result<(), SkipReason> {
        if image.is_flat() {
            return Err(SkipReason::FlatSpectrogram);
        }
        Ok(())
    }
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self::new(1e-4)
    }
}

/// Largest absolute sample value (0 for empty input)
pub fn peak_amplitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |peak, &s| peak.max(s.abs()))
}

/// Scale a segment to unit peak amplitude
pub fn normalize(samples: &[f32], peak: f32) -> Vec<f32> {
    samples.iter().map(|&s| s / peak).collect()
}
