//! Log-mel spectrogram extraction
//!
//! **Algorithm:**
//! 1. Centered STFT: zero-pad `fft_size / 2` on both sides, periodic Hann
//!    window, `1 + len / hop` frames, power spectrum `|X|^2`
//! 2. Slaney-scale mel filterbank with Slaney area normalization
//! 3. dB relative to the segment's own peak power, floored at `amin`,
//!    limited to `top_db` below the peak, clipped to `[-80, 0]`
//!
//! The filterbank, window and FFT plan are built once and shared read-only
//! by all workers.

use crate::error::FeatureError;
use crate::models::SpectralImage;
use melprep_common::config::FeatureConfig;
use ndarray::Array2;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Segment → log-mel spectral image
pub struct FeatureExtractor {
    fft_size: usize,
    hop_length: usize,
    amin: f32,
    top_db: f32,
    window: Vec<f32>,
    /// Shape `(n_mels, fft_size / 2 + 1)`
    mel_basis: Array2<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32, config: &FeatureConfig) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);

        tracing::debug!(
            sample_rate,
            fft_size = config.fft_size,
            hop_length = config.hop_length,
            n_mels = config.n_mels,
            "FeatureExtractor initialized"
        );

        Self {
            fft_size: config.fft_size,
            hop_length: config.hop_length,
            amin: config.amin,
            top_db: config.top_db,
            window: hann_window(config.fft_size),
            mel_basis: mel_filterbank(sample_rate, config.fft_size, config.n_mels),
            fft,
        }
    }

    /// Full chain: power spectrogram → mel → clipped dB
    pub fn extract(&self, samples: &[f32]) -> Result<SpectralImage, FeatureError> {
        let mel = self.mel_spectrogram(samples)?;
        Ok(SpectralImage::new(power_to_db(&mel, self.amin, self.top_db)))
    }

    /// Mel power spectrogram, shape `(n_mels, frames)`
    pub fn mel_spectrogram(&self, samples: &[f32]) -> Result<Array2<f32>, FeatureError> {
        let power = self.power_spectrogram(samples)?;
        Ok(self.mel_basis.dot(&power))
    }

    /// Power spectrogram, shape `(fft_size / 2 + 1, frames)`
    pub fn power_spectrogram(&self, samples: &[f32]) -> Result<Array2<f32>, FeatureError> {
        let pad = self.fft_size / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let n_frames = 1 + (padded.len() - self.fft_size) / self.hop_length;
        let n_freqs = self.fft_size / 2 + 1;

        let mut power = Array2::<f32>::zeros((n_freqs, n_frames));
        let mut input = self.fft.make_input_vec();
        let mut spectrum = self.fft.make_output_vec();

        for t in 0..n_frames {
            let start = t * self.hop_length;
            let frame = &padded[start..start + self.fft_size];

            for ((dst, &sample), &w) in input.iter_mut().zip(frame).zip(&self.window) {
                *dst = sample * w;
            }

            self.fft
                .process(&mut input, &mut spectrum)
                .map_err(|e| FeatureError::Fft(e.to_string()))?;

            for (k, bin) in spectrum.iter().enumerate() {
                power[[k, t]] = bin.re * bin.re + bin.im * bin.im;
            }
        }

        Ok(power)
    }

    pub fn n_mels(&self) -> usize {
        self.mel_basis.nrows()
    }
}

/// Periodic Hann window (DFT-even)
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| {
            let phase = 2.0 * std::f64::consts::PI * n as f64 / size as f64;
            (0.5 - 0.5 * phase.cos()) as f32
        })
        .collect()
}

// Slaney mel scale: linear below 1 kHz, logarithmic above
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular mel filters from 0 Hz to Nyquist, Slaney-normalized
///
/// Returns shape `(n_mels, n_fft / 2 + 1)`.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize) -> Array2<f32> {
    let n_freqs = n_fft / 2 + 1;
    let sr = sample_rate as f64;

    let fft_freqs: Vec<f64> = (0..n_freqs).map(|k| k as f64 * sr / n_fft as f64).collect();

    let min_mel = hz_to_mel(0.0);
    let max_mel = hz_to_mel(sr / 2.0);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| min_mel + (max_mel - min_mel) * i as f64 / (n_mels + 1) as f64)
        .map(mel_to_hz)
        .collect();

    let mut weights = Array2::<f32>::zeros((n_mels, n_freqs));

    for i in 0..n_mels {
        let (left, center, right) = (mel_points[i], mel_points[i + 1], mel_points[i + 2]);
        let enorm = 2.0 / (right - left);

        for (k, &freq) in fft_freqs.iter().enumerate() {
            let lower = (freq - left) / (center - left);
            let upper = (right - freq) / (right - center);
            let w = lower.min(upper).max(0.0);
            weights[[i, k]] = (w * enorm) as f32;
        }
    }

    weights
}

/// Power → dB relative to the matrix maximum
///
/// `10·log10(max(amin, S)) − 10·log10(max(amin, max S))`, then floored at
/// `top_db` below the resulting peak.
pub fn power_to_db(power: &Array2<f32>, amin: f32, top_db: f32) -> Array2<f32> {
    let reference = power.iter().fold(amin, |acc, &v| acc.max(v));
    let ref_db = 10.0 * reference.log10();

    let mut db = power.mapv(|v| 10.0 * v.max(amin).log10() - ref_db);

    let peak = db.iter().fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let floor = peak - top_db;
    db.mapv_inplace(|v| v.max(floor));
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MAX_DB, MIN_DB};

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_mel_scale_round_trip() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_filterbank_shape_and_sign() {
        let basis = mel_filterbank(22050, 512, 128);
        assert_eq!(basis.dim(), (128, 257));
        assert!(basis.iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_hann_window_is_periodic() {
        let window = hann_window(8);
        assert_eq!(window[0], 0.0);
        assert!((window[4] - 1.0).abs() < 1e-6);
        assert!((window[1] - window[7]).abs() < 1e-6);
    }

    #[test]
    fn test_frame_count() {
        let extractor = FeatureExtractor::new(22050, &FeatureConfig::default());
        let image = extractor.extract(&sine(440.0, 22050, 66150)).unwrap();

        assert_eq!(image.n_mels(), 128);
        assert_eq!(image.frames(), 1 + 66150 / 256);
    }

    #[test]
    fn test_values_within_clip_range_and_peak_is_zero() {
        let extractor = FeatureExtractor::new(22050, &FeatureConfig::default());
        let image = extractor.extract(&sine(1000.0, 22050, 22050)).unwrap();

        assert!(image.data().iter().all(|&v| (MIN_DB..=MAX_DB).contains(&v)));
        let peak = image.data().iter().fold(f32::NEG_INFINITY, |a, &v| a.max(v));
        assert_eq!(peak, MAX_DB);
        assert!(!image.is_flat());
    }

    #[test]
    fn test_tone_energy_lands_in_matching_band() {
        let extractor = FeatureExtractor::new(22050, &FeatureConfig::default());
        let mel = extractor.mel_spectrogram(&sine(1000.0, 22050, 22050)).unwrap();

        let band_energy: Vec<f32> = mel.rows().into_iter().map(|row| row.sum()).collect();
        let loudest = band_energy
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &e)| if e > best.1 { (i, e) } else { best })
            .0;

        // 1 kHz is mel 15; band centres are spaced (max_mel / 129) apart
        let spacing = hz_to_mel(11025.0) / 129.0;
        let expected = (15.0 / spacing).round() as usize - 1;
        assert!(
            loudest.abs_diff(expected) <= 2,
            "loudest band {} expected near {}",
            loudest,
            expected
        );
    }

    #[test]
    fn test_silence_gives_all_zero_db() {
        let extractor = FeatureExtractor::new(22050, &FeatureConfig::default());
        let image = extractor.extract(&vec![0.0; 4096]).unwrap();

        assert!(image.data().iter().all(|&v| v == MAX_DB));
        assert!(image.is_flat());
    }

    #[test]
    fn test_power_to_db_respects_top_db() {
        let power = Array2::from_shape_vec((1, 3), vec![1.0, 1e-3, 1e-12]).unwrap();
        let db = power_to_db(&power, 1e-6, 80.0);

        assert_eq!(db[[0, 0]], 0.0);
        assert!((db[[0, 1]] + 30.0).abs() < 1e-3);
        // Floored by amin at -60 dB, inside the top_db window
        assert!((db[[0, 2]] + 60.0).abs() < 1e-3);
    }
}
