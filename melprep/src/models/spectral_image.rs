//! Log-mel spectrogram matrix

use ndarray::Array2;

/// Lower clip boundary in dB
pub const MIN_DB: f32 = -80.0;
/// Upper clip boundary in dB (the segment's own peak power)
pub const MAX_DB: f32 = 0.0;

/// Decibel-scale mel magnitudes, shape `(n_mels, time_frames)`, values in `[MIN_DB, MAX_DB]`
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralImage {
    data: Array2<f32>,
}

impl SpectralImage {
    /// Wrap a matrix, clipping every value into `[MIN_DB, MAX_DB]`
    pub fn new(mut data: Array2<f32>) -> Self {
        data.mapv_inplace(|v| v.clamp(MIN_DB, MAX_DB));
        Self { data }
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn n_mels(&self) -> usize {
        self.data.nrows()
    }

    pub fn frames(&self) -> usize {
        self.data.ncols()
    }

    /// True when every value sits on the same clip boundary
    pub fn is_flat(&self) -> bool {
        self.data.iter().all(|&v| v == MIN_DB) || self.data.iter().all(|&v| v == MAX_DB)
    }
}
