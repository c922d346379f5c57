//! Chroma extraction modules
//!
//! Extract pitch-class distribution (12 semitones) from audio:
//! - STFT chroma (Gaussian filterbank over the power spectrum)
//! - CQT chroma (constant-Q magnitudes folded to pitch classes)
//! - CENS (quantized, smoothed, normalized CQT chroma)

pub mod cqt;
pub mod extractor;
pub mod normalization;
pub mod pitch_class;
pub mod smoothing;
pub mod spectrum;
pub mod stft;

pub use extractor::{ChromaExtractor, SpectralChromaExtractor};
pub use pitch_class::{PitchClassVector, N_PITCH_CLASSES, PITCH_CLASS_NAMES};

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chroma family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromaType {
    /// Chroma Energy Normalized Statistics (smoothed, robust to timbre)
    Cens,
    /// Short-time Fourier transform chroma
    Stft,
    /// Constant-Q transform chroma
    Cqt,
}

impl ChromaType {
    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            ChromaType::Cens => "CENS",
            ChromaType::Stft => "STFT",
            ChromaType::Cqt => "CQT",
        }
    }
}

impl fmt::Display for ChromaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChromaType {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cens" | "chroma_cens" => Ok(ChromaType::Cens),
            "stft" | "stft-chroma" | "chroma_stft" => Ok(ChromaType::Stft),
            "cqt" | "cqt-chroma" | "chroma_cqt" => Ok(ChromaType::Cqt),
            other => Err(AnalysisError::InvalidInput(format!(
                "Unknown chroma type '{}' (expected CENS, STFT or CQT)",
                other
            ))),
        }
    }
}

/// Chroma frames over time plus the framing they were computed with
///
/// Frame `t` summarizes the hop block `[t * hop_size, (t + 1) * hop_size)`
/// of the source audio, so `n_frames == ceil(n_samples / hop_size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromagram {
    /// 12-element chroma vectors, one per frame
    pub frames: Vec<Vec<f32>>,

    /// Sample rate of the source audio in Hz
    pub sample_rate: u32,

    /// Hop size in samples
    pub hop_size: usize,

    /// Length of the source audio in samples
    pub n_samples: usize,

    /// Time of sample 0 in the original recording, in seconds
    pub time_offset: f32,

    /// Chroma family that produced the frames
    pub chroma_type: ChromaType,
}

impl Chromagram {
    /// Wrap precomputed frames, assuming `n_samples = frames.len() * hop_size`
    pub fn from_frames(
        frames: Vec<Vec<f32>>,
        sample_rate: u32,
        hop_size: usize,
        chroma_type: ChromaType,
    ) -> Self {
        let n_samples = frames.len() * hop_size;
        Self {
            frames,
            sample_rate,
            hop_size,
            n_samples,
            time_offset: 0.0,
            chroma_type,
        }
    }

    /// Number of frames
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Frames per second
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate as f32 / self.hop_size as f32
    }

    /// Duration of the source audio in seconds
    pub fn duration(&self) -> f32 {
        self.n_samples as f32 / self.sample_rate as f32
    }

    /// Start time of a frame in seconds (original timeline)
    pub fn frame_time(&self, frame: usize) -> f32 {
        self.time_offset + (frame * self.hop_size) as f32 / self.sample_rate as f32
    }
}
