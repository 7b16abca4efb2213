//! Audio Decoding Utilities
//!
//! **Purpose:** Decode audio files to mono f32 PCM at a fixed sample rate
//!
//! Uses symphonia for format-agnostic decoding (WAV, FLAC, MP3, etc.) and
//! rubato for sinc resampling to the pipeline rate.

use crate::error::DecodeError;
use crate::models::SampleSequence;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Turns a file into mono samples at a requested rate
///
/// Shared by all workers, so implementations hold no per-file state.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path, target_sample_rate: u32) -> Result<SampleSequence, DecodeError>;
}

/// symphonia + rubato decoder
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path, target_sample_rate: u32) -> Result<SampleSequence, DecodeError> {
        let (samples, native_rate) = decode_mono(path)?;

        let samples = if native_rate != target_sample_rate && !samples.is_empty() {
            tracing::debug!(
                path = %path.display(),
                from = native_rate,
                to = target_sample_rate,
                "Resampling using rubato"
            );
            resample_mono(samples, native_rate, target_sample_rate)?
        } else {
            samples
        };

        Ok(SampleSequence::new(samples, target_sample_rate))
    }
}

/// Decode the first audio track of a file to mono f32 samples
///
/// **Algorithm:**
/// 1. Open file and probe format using symphonia
/// 2. Find default audio track
/// 3. Decode all packets, averaging channels to mono
///
/// # Returns
/// * Mono samples and the native sample rate
fn decode_mono(file_path: &Path) -> Result<(Vec<f32>, u32), DecodeError> {
    tracing::debug!(path = %file_path.display(), "Decoding audio file");

    let file = std::fs::File::open(file_path).map_err(|source| DecodeError::Open {
        path: file_path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create format hint from file extension
    let mut hint = Hint::new();
    if let Some(extension) = file_path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::Unsupported("No audio track found in file".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::Unsupported("Sample rate unknown".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                // End of stream
                break;
            }
            Err(e) => return Err(DecodeError::Packet(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| DecodeError::Packet(e.to_string()))?;

        append_mono(&decoded, &mut all_samples);
    }

    tracing::debug!(
        path = %file_path.display(),
        total_samples = all_samples.len(),
        sample_rate,
        "Audio decoding complete"
    );

    Ok((all_samples, sample_rate))
}

/// Average all channels of a decoded buffer into `out`
fn append_mono(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => mix_down(buf, out),
        AudioBufferRef::F64(buf) => mix_down(buf, out),
        AudioBufferRef::U8(buf) => mix_down(buf, out),
        AudioBufferRef::U16(buf) => mix_down(buf, out),
        AudioBufferRef::U24(buf) => mix_down(buf, out),
        AudioBufferRef::U32(buf) => mix_down(buf, out),
        AudioBufferRef::S8(buf) => mix_down(buf, out),
        AudioBufferRef::S16(buf) => mix_down(buf, out),
        AudioBufferRef::S24(buf) => mix_down(buf, out),
        AudioBufferRef::S32(buf) => mix_down(buf, out),
    }
}

fn mix_down<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    let num_frames = buf.frames();
    if num_channels == 0 {
        return;
    }

    out.reserve(num_frames);
    for frame_idx in 0..num_frames {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}

/// Resample mono PCM with rubato SincFixedIn in a single pass
///
/// - 256-tap sinc filter, BlackmanHarris2 window
/// - 0.95 cutoff to prevent aliasing
///
/// The filter delay (`output_delay()`) is trimmed from the front and the tail
/// flushed with zero input, so output sample `k` lines up with input time
/// `k / target_rate` and the length is `round(len * ratio)`.
fn resample_mono(
    samples: Vec<f32>,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, DecodeError> {
    let num_frames = samples.len();

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / source_rate as f64;
    let expected_frames = (num_frames as f64 * ratio).round() as usize;

    // Chunk size = input length for single-pass processing
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, num_frames, 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    let mut resampled = resampler
        .process(&[samples], None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?
        .pop()
        .unwrap_or_default();

    while resampled.len() < delay + expected_frames {
        let tail = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?
            .pop()
            .unwrap_or_default();
        if tail.is_empty() {
            break;
        }
        resampled.extend(tail);
    }

    resampled.drain(..delay.min(resampled.len()));
    resampled.truncate(expected_frames);

    tracing::debug!(
        frames_in = num_frames,
        frames_out = resampled.len(),
        delay,
        source_rate,
        target_rate,
        "Resampled"
    );

    Ok(resampled)
}
