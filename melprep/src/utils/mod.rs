//! Utility modules for melprep

pub mod audio_decoder;

pub use audio_decoder::{AudioDecoder, SymphoniaDecoder};
