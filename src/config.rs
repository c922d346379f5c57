//! Configuration parameters for relative mode estimation

use crate::analysis::distance::DistanceMetric;
use crate::features::chroma::ChromaType;
use serde::{Deserialize, Serialize};

/// Frequency of C1 in Hz (default lowest CQT bin)
pub const C1_HZ: f32 = 32.703_197;

/// Chroma extraction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromaConfig {
    /// Chroma family (default: CQT)
    pub chroma_type: ChromaType,

    /// FFT frame size for STFT chroma (default: 2048)
    pub frame_size: usize,

    /// Hop size in samples between chroma frames (default: 512)
    pub hop_size: usize,

    /// Lowest CQT bin frequency in Hz (default: C1, 32.70 Hz)
    pub fmin: f32,

    /// Number of CQT octaves (default: 7)
    pub n_octaves: usize,

    /// CQT bins per octave, multiple of 12 (default: 24)
    pub bins_per_octave: usize,

    /// Tuning deviation from A440 in fractions of a semitone (default: 0.0)
    pub tuning: f32,

    /// CENS smoothing window length in frames (default: 41, 0 disables)
    pub cens_smoothing: usize,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            chroma_type: ChromaType::Cqt,
            frame_size: 2048,
            hop_size: 512,
            fmin: C1_HZ,
            n_octaves: 7,
            bins_per_octave: 24,
            tuning: 0.0,
            cens_smoothing: 41,
        }
    }
}

impl ChromaConfig {
    /// Default parameters for a given chroma family
    pub fn for_type(chroma_type: ChromaType) -> Self {
        Self {
            chroma_type,
            ..Self::default()
        }
    }
}

/// One branch of a relative mode comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentConfig {
    /// Human-readable label for reports
    pub label: String,

    /// Chroma extraction parameters
    pub chroma: ChromaConfig,

    /// Fragment start in seconds (None = start of audio)
    pub start: Option<f32>,

    /// Fragment end in seconds (None = end of audio)
    pub end: Option<f32>,
}

impl FragmentConfig {
    /// Whole-clip fragment with the given chroma family
    pub fn whole_clip(label: &str, chroma_type: ChromaType) -> Self {
        Self {
            label: label.to_string(),
            chroma: ChromaConfig::for_type(chroma_type),
            start: None,
            end: None,
        }
    }
}

/// Relative mode estimation: two named configurations of the same estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeModeConfig {
    /// Template profile name (default: "simple")
    pub profile: String,

    /// First estimation (default: CQT chroma, whole clip)
    pub primary: FragmentConfig,

    /// Second estimation (default: STFT chroma, whole clip)
    pub comparison: FragmentConfig,
}

impl Default for RelativeModeConfig {
    fn default() -> Self {
        Self {
            profile: "simple".to_string(),
            primary: FragmentConfig::whole_clip("cqt", ChromaType::Cqt),
            comparison: FragmentConfig::whole_clip("stft", ChromaType::Stft),
        }
    }
}

impl RelativeModeConfig {
    /// Default branches with a different profile
    pub fn with_profile(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            ..Self::default()
        }
    }
}

/// Relative mode estimation across time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RmeConfig {
    /// Window length in seconds (default: 3.0)
    pub window_length: f32,

    /// Hop between window starts in seconds (default: 3.0)
    pub hop_length: f32,

    /// Seconds removed from the start of the audio (default: 0.0)
    pub crop_start: f32,

    /// Seconds removed from the end of the audio (default: 0.0)
    pub crop_end: f32,

    /// Chroma extraction parameters (default: CENS)
    pub chroma: ChromaConfig,

    /// Template profile name (default: "albrecht")
    pub profile: String,

    /// Distance between consecutive windows (default: cosine)
    pub distance: DistanceMetric,
}

impl Default for RmeConfig {
    fn default() -> Self {
        Self {
            window_length: 3.0,
            hop_length: 3.0,
            crop_start: 0.0,
            crop_end: 0.0,
            chroma: ChromaConfig::for_type(ChromaType::Cens),
            profile: "albrecht".to_string(),
            distance: DistanceMetric::Cosine,
        }
    }
}
