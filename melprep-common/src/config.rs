//! Configuration loading and data folder resolution
//!
//! Every table carries `#[serde(default)]`, so an empty or partial TOML file
//! yields the built-in defaults for whatever it leaves out.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable consulted for the data folder when no CLI argument is given
pub const DATA_FOLDER_ENV: &str = "MELPREP_DATA_FOLDER";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder containing the raw `.wav` recordings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub segmenting: SegmentingConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter level; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Decode settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Every file is resampled to this rate before segmenting
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { sample_rate: 22050 }
    }
}

/// Per-class windowing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentingConfig {
    pub dog_window_seconds: f64,
    /// Advance between successive dog windows
    pub dog_overlap_seconds: f64,
    pub cat_window_seconds: f64,
}

impl Default for SegmentingConfig {
    fn default() -> Self {
        Self {
            dog_window_seconds: 3.0,
            dog_overlap_seconds: 0.8,
            cat_window_seconds: 3.0,
        }
    }
}

/// Spectrogram and segment filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub fft_size: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    /// Segments whose peak absolute amplitude is below this are skipped as silent
    pub silence_threshold: f32,
    /// Power floor applied before the dB conversion
    pub amin: f32,
    pub top_db: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            hop_length: 256,
            n_mels: 128,
            silence_threshold: 1e-4,
            amin: 1e-6,
            top_db: 80.0,
        }
    }
}

/// Worker pool sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            workers: 4,
        }
    }
}

/// Image raster size and report file names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub image_width: u32,
    pub image_height: u32,
    pub cat_log_name: String,
    pub dog_log_name: String,
    pub other_log_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 300,
            cat_log_name: "cat_process_log.txt".to_string(),
            dog_log_name: "dog_process_log.txt".to_string(),
            other_log_name: "other_process_log.txt".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Load from an explicit path, else from the platform default location,
    /// else fall back to built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        fn require(ok: bool, what: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::Config(what.to_string()))
            }
        }

        require(self.audio.sample_rate > 0, "audio.sample_rate must be > 0")?;
        require(
            self.segmenting.dog_window_seconds > 0.0,
            "segmenting.dog_window_seconds must be > 0",
        )?;
        require(
            self.segmenting.dog_overlap_seconds > 0.0,
            "segmenting.dog_overlap_seconds must be > 0",
        )?;
        require(
            self.segmenting.cat_window_seconds > 0.0,
            "segmenting.cat_window_seconds must be > 0",
        )?;

        let sr = self.audio.sample_rate as f64;
        require(
            (self.segmenting.dog_window_seconds * sr) as usize > 0
                && (self.segmenting.cat_window_seconds * sr) as usize > 0,
            "window length rounds to zero samples at the configured sample rate",
        )?;
        require(
            (self.segmenting.dog_overlap_seconds * sr) as usize > 0,
            "segmenting.dog_overlap_seconds rounds to zero samples",
        )?;

        require(
            self.features.fft_size >= 2 && self.features.fft_size % 2 == 0,
            "features.fft_size must be an even number >= 2",
        )?;
        require(self.features.hop_length > 0, "features.hop_length must be > 0")?;
        require(self.features.n_mels > 0, "features.n_mels must be > 0")?;
        require(self.features.amin > 0.0, "features.amin must be > 0")?;
        require(self.features.top_db > 0.0, "features.top_db must be > 0")?;

        require(self.scheduler.batch_size > 0, "scheduler.batch_size must be > 0")?;
        require(self.scheduler.workers > 0, "scheduler.workers must be > 0")?;

        require(
            self.output.image_width > 0 && self.output.image_height > 0,
            "output image dimensions must be > 0",
        )?;

        Ok(())
    }
}

/// Platform config file location (`~/.config/melprep/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("melprep").join("config.toml"))
}

/// Data folder resolution priority:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML `data_folder`
pub fn resolve_data_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
        warn!("{} is set but empty, ignoring", env_var_name);
    }

    if let Some(path) = &config.data_folder {
        return Ok(path.clone());
    }

    Err(Error::Config(format!(
        "Data folder not configured. Use one of:\n\
         1. Command line: --data-folder <DIR>\n\
         2. Environment: {}=<DIR>\n\
         3. TOML config: data_folder = \"<DIR>\"",
        env_var_name
    )))
}

/// Write a config to disk atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
