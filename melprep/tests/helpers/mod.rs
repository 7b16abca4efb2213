//! Test Helper Utilities
//!
//! Shared utilities for testing melprep

#![allow(dead_code)]

pub mod audio_generator;

pub use audio_generator::{generate_test_library, generate_test_wav, write_corrupt_wav, AudioConfig};

use melprep_common::{OutputLayout, TomlConfig};
use std::collections::BTreeMap;
use std::path::Path;

/// Config sized for fast tests: 8 kHz, half-second windows, small images
pub fn test_config() -> TomlConfig {
    let mut config = TomlConfig::default();
    config.audio.sample_rate = 8000;
    config.segmenting.dog_window_seconds = 0.5;
    config.segmenting.dog_overlap_seconds = 0.25;
    config.segmenting.cat_window_seconds = 0.5;
    config.output.image_width = 40;
    config.output.image_height = 30;
    config
}

pub fn layout_for(data_folder: &Path, config: &TomlConfig) -> OutputLayout {
    OutputLayout::under(data_folder, &config.output)
}

/// Log file content as lines
pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Number of PNG files directly in `dir`
pub fn count_pngs(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().map_or(false, |ext| ext == "png"))
                .count()
        })
        .unwrap_or(0)
}

/// Decoded grayscale pixels of every PNG in `dir`, keyed by file name
pub fn png_pixels(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "png"))
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            let pixels = image::open(&p).unwrap().to_luma8().into_raw();
            (name, pixels)
        })
        .collect()
}
