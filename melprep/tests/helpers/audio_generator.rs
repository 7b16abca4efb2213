//! WAV fixture generator
//!
//! Writes small 16-bit PCM recordings with hound so integration tests can run
//! the real symphonia decode path.

use std::path::{Path, PathBuf};

/// Shape of a generated recording
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Peak level in 0.0..=1.0; 0.0 writes digital silence
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 1.0,
            sample_rate: 8000,
            channels: 1,
            amplitude: 0.3,
            frequency: 440.0,
        }
    }
}

impl AudioConfig {
    pub fn silent(duration_seconds: f64) -> Self {
        Self {
            duration_seconds,
            amplitude: 0.0,
            ..Default::default()
        }
    }
}

/// Generate a sine tone WAV file
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64) as usize;

    for i in 0..total_samples {
        let t = i as f32 / config.sample_rate as f32;
        let sample = (config.amplitude
            * (2.0 * std::f32::consts::PI * config.frequency * t).sin()
            * i16::MAX as f32) as i16;

        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Generate `count` files named `{prefix}_{nnn}.wav`
pub fn generate_test_library(
    dir: &Path,
    prefix: &str,
    count: usize,
    config: &AudioConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    (0..count)
        .map(|i| generate_test_wav(&dir.join(format!("{}_{:03}.wav", prefix, i + 1)), config))
        .collect()
}

/// A `.wav` file whose content is not audio
pub fn write_corrupt_wav(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::write(path, b"this is not a RIFF file")?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generate_simple_wav() {
        let temp_dir = TempDir::new().unwrap();
        let wav_path = temp_dir.path().join("dog_test.wav");

        generate_test_wav(&wav_path, &AudioConfig::default()).unwrap();

        let reader = hound::WavReader::open(&wav_path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 8000);
    }

    #[test]
    fn test_generate_library_names() {
        let temp_dir = TempDir::new().unwrap();
        let files =
            generate_test_library(temp_dir.path(), "cat", 3, &AudioConfig::default()).unwrap();

        assert_eq!(files.len(), 3);
        assert!(files[2].ends_with("cat_003.wav"));
    }
}
