//! End-to-end runs over generated WAV folders
//!
//! Uses the real symphonia decoder against files written with hound.

mod helpers;

use helpers::*;
use melprep::utils::SymphoniaDecoder;
use melprep::ClassLabel;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_mixed_folder_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path();
    let config = test_config();

    // 1 s dog → windows at 0, 2000, 4000 (3 images)
    generate_test_library(data, "dog", 2, &AudioConfig::default()).unwrap();
    // 0.75 s cat → two tiles, the second wrapped (2 images)
    let cat = AudioConfig {
        duration_seconds: 0.75,
        ..Default::default()
    };
    generate_test_library(data, "cat", 2, &cat).unwrap();
    generate_test_wav(&data.join("bird_chirp.wav"), &AudioConfig::default()).unwrap();
    write_corrupt_wav(&data.join("dog_broken.wav")).unwrap();
    std::fs::write(data.join("dog_notes.txt"), "not audio").unwrap();

    let summary = melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();

    assert!(summary.failed_batches.is_empty());
    assert_eq!(summary.files_processed(), 6);
    assert_eq!(summary.file_errors(), 1);
    assert_eq!(summary.unclassified_files(), 1);
    assert_eq!(summary.images_written(), 10);

    let layout = layout_for(data, &config);
    assert_eq!(count_pngs(&layout.dog_dir), 6);
    assert_eq!(count_pngs(&layout.cat_dir), 4);
    assert!(layout
        .dog_dir
        .join("dog_001_segment_3_log_mel_spectrogram.png")
        .exists());
    assert!(layout
        .cat_dir
        .join("cat_002_segment_2_log_mel_spectrogram.png")
        .exists());

    let dog_lines = read_lines(&layout.dog_log);
    assert_eq!(dog_lines.len(), 7);
    assert_eq!(
        dog_lines
            .iter()
            .filter(|l| l.starts_with("Error processing dog_broken: "))
            .count(),
        1
    );

    assert_eq!(read_lines(&layout.cat_log).len(), 4);
    assert_eq!(
        read_lines(&layout.other_log),
        vec!["File does not match 'cat' or 'dog': bird_chirp".to_string()]
    );
}

#[tokio::test]
async fn test_images_have_configured_size() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path();
    let config = test_config();
    generate_test_wav(&data.join("cat_tone.wav"), &AudioConfig::default()).unwrap();

    melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();

    let path = layout_for(data, &config)
        .cat_dir
        .join("cat_tone_segment_1_log_mel_spectrogram.png");
    let (width, height) = image::image_dimensions(&path).unwrap();
    assert_eq!((width, height), (40, 30));
}

#[tokio::test]
async fn test_silent_recording_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path();
    let config = test_config();
    generate_test_wav(&data.join("dog_silence.wav"), &AudioConfig::silent(1.0)).unwrap();

    let summary = melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();

    assert_eq!(summary.images_written(), 0);
    assert_eq!(summary.segments_skipped(), 3);

    let layout = layout_for(data, &config);
    assert_eq!(count_pngs(&layout.dog_dir), 0);
    assert_eq!(
        read_lines(&layout.dog_log),
        vec![
            "Skipping segment dog_silence_segment_1 - silent".to_string(),
            "Skipping segment dog_silence_segment_2 - silent".to_string(),
            "Skipping segment dog_silence_segment_3 - silent".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_resamples_to_configured_rate() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path();
    let config = test_config();

    // 1.2 s at 16 kHz → ~9600 samples at 8 kHz → 3 dog windows
    let wide = AudioConfig {
        duration_seconds: 1.2,
        sample_rate: 16000,
        channels: 2,
        ..Default::default()
    };
    generate_test_wav(&data.join("dog_wide.wav"), &wide).unwrap();

    let summary = melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();

    assert_eq!(summary.file_errors(), 0);
    assert_eq!(summary.images_written(), 3);
}

#[tokio::test]
async fn test_rerun_reproduces_logs_and_images() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path();
    let config = test_config();
    generate_test_library(data, "dog", 3, &AudioConfig::default()).unwrap();
    generate_test_library(data, "cat", 2, &AudioConfig::default()).unwrap();
    write_corrupt_wav(&data.join("cat_bad.wav")).unwrap();

    let layout = layout_for(data, &config);
    let snapshot = || {
        let mut dog = read_lines(&layout.dog_log);
        let mut cat = read_lines(&layout.cat_log);
        dog.sort();
        cat.sort();
        (dog, cat, png_pixels(&layout.dog_dir), png_pixels(&layout.cat_dir))
    };

    melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();
    let first = snapshot();

    // The Processed/ tree from the first run must not be picked up
    let summary = melprep::run(&config, data, Arc::new(SymphoniaDecoder))
        .await
        .unwrap();
    let second = snapshot();

    assert_eq!(summary.files_processed(), 6);
    assert_eq!(first.2.len(), 9);
    assert_eq!(first.3.len(), 4);
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    // Same pixels, not just the same file names
    assert_eq!(first.2, second.2);
    assert_eq!(first.3, second.3);
}

#[tokio::test]
async fn test_missing_data_folder_is_setup_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config();
    let missing = temp_dir.path().join("nowhere").join("deeper");
    std::fs::write(temp_dir.path().join("nowhere"), "a file, not a folder").unwrap();

    let result = melprep::run(&config, &missing, Arc::new(SymphoniaDecoder)).await;

    assert!(result.is_err());
}

#[test]
fn test_filename_classification() {
    assert_eq!(ClassLabel::from_file_name("Dog_and_cat"), ClassLabel::Dog);
    assert_eq!(ClassLabel::from_file_name("CATS_3"), ClassLabel::Cat);
    assert_eq!(ClassLabel::from_file_name("bobcat"), ClassLabel::Other);
    assert_eq!(ClassLabel::from_file_name("sparrow"), ClassLabel::Other);
}
