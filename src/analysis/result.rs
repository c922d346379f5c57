//! Analysis result types

use crate::features::chroma::{Chromagram, PitchClassVector, N_PITCH_CLASSES, PITCH_CLASS_NAMES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Musical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Get key name in musical notation (e.g., "C", "Am", "F#", "D#m")
    ///
    /// # Example
    ///
    /// ```
    /// use relative_mode::analysis::result::Key;
    ///
    /// assert_eq!(Key::Major(0).name(), "C");
    /// assert_eq!(Key::Major(6).name(), "F#");
    /// assert_eq!(Key::Minor(9).name(), "Am");
    /// assert_eq!(Key::Minor(1).name(), "C#m");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Key::Major(i) => PITCH_CLASS_NAMES[*i as usize % N_PITCH_CLASSES].to_string(),
            Key::Minor(i) => format!("{}m", PITCH_CLASS_NAMES[*i as usize % N_PITCH_CLASSES]),
        }
    }

    /// Tonic pitch class (0-11)
    pub fn tonic(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % N_PITCH_CLASSES as u32,
        }
    }

    /// True for major keys
    pub fn is_major(&self) -> bool {
        matches!(self, Key::Major(_))
    }

    /// Relative major/minor (C <-> Am)
    pub fn relative(&self) -> Key {
        match self {
            Key::Major(i) => Key::Minor((i + 9) % 12),
            Key::Minor(i) => Key::Major((i + 3) % 12),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Major(i) => write!(f, "{} major", PITCH_CLASS_NAMES[*i as usize % 12]),
            Key::Minor(i) => write!(f, "{} minor", PITCH_CLASS_NAMES[*i as usize % 12]),
        }
    }
}

/// Fit of a chroma vector against one template rotated to one tonic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFitScore {
    /// Tonic (semitone offset from C, 0-11)
    pub tonic: u32,

    /// Pearson correlation with the rotated template
    pub correlation: f32,
}

/// Tonal estimate for one audio fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonalFragment {
    /// Profile the templates came from
    pub profile: String,

    /// Aggregate (mean) pitch-class vector of the fragment
    pub chroma: PitchClassVector,

    /// Correlation with the major template for each tonic (index = tonic)
    pub major_correlations: [f32; N_PITCH_CLASSES],

    /// Correlation with the minor template for each tonic (index = tonic)
    pub minor_correlations: [f32; N_PITCH_CLASSES],

    /// Best-fitting major key
    pub best_major: KeyFitScore,

    /// Best-fitting minor key
    pub best_minor: KeyFitScore,

    /// Best key across all 24 candidates
    pub key: Key,

    /// Correlation of `key`
    pub best_correlation: f32,

    /// Runner-up key whose correlation exceeds 90% of the best, if any
    pub alt_key: Option<(Key, f32)>,

    /// Best major correlation minus best minor correlation
    ///
    /// Positive is more major-like, negative more minor-like.
    pub tondeltamax: f32,
}

impl TonalFragment {
    /// Correlation for any of the 24 keys
    pub fn correlation(&self, key: Key) -> f32 {
        match key {
            Key::Major(i) => self.major_correlations[i as usize % 12],
            Key::Minor(i) => self.minor_correlations[i as usize % 12],
        }
    }
}

impl fmt::Display for TonalFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "likely key: {} (r = {:.3}), profile '{}'",
            self.key, self.best_correlation, self.profile
        )?;
        if let Some((alt, corr)) = self.alt_key {
            writeln!(f, "also possible: {} (r = {:.3})", alt, corr)?;
        }
        writeln!(f, "tondeltamax: {:.3}", self.tondeltamax)?;
        for (i, name) in PITCH_CLASS_NAMES.iter().enumerate() {
            writeln!(
                f,
                "{:<3} chroma {:>7.3}  major {:>6.3}  minor {:>6.3}",
                name, self.chroma[i], self.major_correlations[i], self.minor_correlations[i]
            )?;
        }
        Ok(())
    }
}

/// Pair of fragment estimates from two configurations of the same audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeModeResult {
    /// Label of the primary configuration
    pub primary_label: String,

    /// Estimate under the primary configuration
    pub primary: TonalFragment,

    /// Label of the comparison configuration
    pub comparison_label: String,

    /// Estimate under the comparison configuration
    pub comparison: TonalFragment,
}

impl RelativeModeResult {
    /// Both estimates as a tuple (primary, comparison)
    pub fn into_pair(self) -> (TonalFragment, TonalFragment) {
        (self.primary, self.comparison)
    }
}

/// One analysis window of a time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Window start in seconds (original, uncropped timeline)
    pub start_time: f32,

    /// Window end in seconds
    pub end_time: f32,

    /// First chroma frame of the window
    pub start_frame: usize,

    /// One past the last chroma frame of the window
    pub end_frame: usize,

    /// Tonal delta of the window
    pub tondeltamax: f32,

    /// Distance to the previous window's aggregate chroma; `None` for the first window
    pub distance: Option<f32>,

    /// Full estimate for the window
    pub fragment: TonalFragment,
}

/// Relative mode estimates across time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Per-window results, ordered by start time
    pub points: Vec<TimeSeriesPoint>,

    /// Full-resolution chromagram the windows were cut from
    pub chromagram: Chromagram,
}

impl TimeSeries {
    /// Number of windows
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the series has no windows
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Window start times in seconds
    pub fn start_times(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.start_time).collect()
    }

    /// Tonal delta per window
    pub fn tondeltamax(&self) -> Vec<f32> {
        self.points.iter().map(|p| p.tondeltamax).collect()
    }

    /// Inter-window distances (first entry is always `None`)
    pub fn distances(&self) -> Vec<Option<f32>> {
        self.points.iter().map(|p| p.distance).collect()
    }
}
