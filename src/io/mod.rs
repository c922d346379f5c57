//! Audio I/O modules
//!
//! Audio decoding using Symphonia.

pub mod decoder;

pub use decoder::{decode_audio, AudioLoader, DecodedAudio, SymphoniaLoader};
