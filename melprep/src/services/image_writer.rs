//! Spectrogram PNG output
//!
//! Renders a `SpectralImage` as a borderless grayscale raster: -80 dB is
//! black, 0 dB white, lowest mel band on the bottom row. Each call builds its
//! own buffer; nothing is kept between calls.

use crate::error::WriteError;
use crate::models::{SpectralImage, MAX_DB, MIN_DB};
use image::{GrayImage, ImageFormat, Luma};
use std::path::{Path, PathBuf};

/// Output file name for a segment stem
pub fn image_file_name(stem: &str) -> String {
    format!("{}_log_mel_spectrogram.png", stem)
}

/// Fixed-size grayscale PNG writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageWriter {
    width: u32,
    height: u32,
}

impl ImageWriter {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Nearest-neighbour resample of the matrix onto the raster
    pub fn render(&self, image: &SpectralImage) -> GrayImage {
        let data = image.data();
        let (n_mels, frames) = (image.n_mels(), image.frames());

        if n_mels == 0 || frames == 0 {
            return GrayImage::new(self.width, self.height);
        }

        GrayImage::from_fn(self.width, self.height, |x, y| {
            let col = (x as usize * frames) / self.width as usize;
            // Row 0 of the raster is the highest band
            let flipped = (self.height - 1 - y) as usize;
            let row = (flipped * n_mels) / self.height as usize;
            Luma([to_gray(data[[row, col]])])
        })
    }

    /// Render and save `{stem}_log_mel_spectrogram.png` under `dir`
    pub fn write(&self, image: &SpectralImage, dir: &Path, stem: &str) -> Result<PathBuf, WriteError> {
        let path = dir.join(image_file_name(stem));

        self.render(image)
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| WriteError {
                stem: stem.to_string(),
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Spectrogram image written");
        Ok(path)
    }
}

impl Default for ImageWriter {
    fn default() -> Self {
        Self::new(400, 300)
    }
}

fn to_gray(db: f32) -> u8 {
    let unit = ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0);
    (unit * 255.0).round() as u8
}
