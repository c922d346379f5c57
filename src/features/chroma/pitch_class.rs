//! Fixed-size pitch-class vectors
//!
//! A pitch-class vector holds one energy value per semitone class
//! (C, C#, ..., B). Pitch-class space is fixed at 12, so rotation is a
//! plain circular shift over a `[f32; 12]`.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of pitch classes in twelve-tone equal temperament
pub const N_PITCH_CLASSES: usize = 12;

/// Pitch class names, index 0 = C
pub const PITCH_CLASS_NAMES: [&str; N_PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Energy per pitch class for one frame or an aggregated fragment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchClassVector([f32; N_PITCH_CLASSES]);

impl PitchClassVector {
    /// Wrap 12 values (C first)
    pub const fn new(values: [f32; N_PITCH_CLASSES]) -> Self {
        Self(values)
    }

    /// All-zero vector
    pub const fn zeros() -> Self {
        Self([0.0; N_PITCH_CLASSES])
    }

    /// Build from a slice, failing with `InvalidShape` unless it has exactly 12 elements
    pub fn from_slice(values: &[f32]) -> Result<Self, AnalysisError> {
        if values.len() != N_PITCH_CLASSES {
            return Err(AnalysisError::InvalidShape(format!(
                "Pitch-class vector must have {} elements, got {}",
                N_PITCH_CLASSES,
                values.len()
            )));
        }
        let mut out = [0.0f32; N_PITCH_CLASSES];
        out.copy_from_slice(values);
        Ok(Self(out))
    }

    /// Mean vector across chroma frames
    ///
    /// Every frame must have 12 elements and finite values. An empty frame
    /// list carries no tonal information and fails with `DegenerateInput`.
    pub fn mean_of(frames: &[Vec<f32>]) -> Result<Self, AnalysisError> {
        if frames.is_empty() {
            return Err(AnalysisError::DegenerateInput(
                "No chroma frames to aggregate".to_string(),
            ));
        }

        let mut acc = [0.0f64; N_PITCH_CLASSES];
        for (i, frame) in frames.iter().enumerate() {
            if frame.len() != N_PITCH_CLASSES {
                return Err(AnalysisError::InvalidShape(format!(
                    "Chroma frame at index {} has {} elements, expected {}",
                    i,
                    frame.len(),
                    N_PITCH_CLASSES
                )));
            }
            for (a, &v) in acc.iter_mut().zip(frame.iter()) {
                if !v.is_finite() {
                    return Err(AnalysisError::InvalidInput(format!(
                        "Chroma frame at index {} contains a non-finite value",
                        i
                    )));
                }
                *a += v as f64;
            }
        }

        let n = frames.len() as f64;
        let mut out = [0.0f32; N_PITCH_CLASSES];
        for (o, a) in out.iter_mut().zip(acc.iter()) {
            *o = (a / n) as f32;
        }
        Ok(Self(out))
    }

    /// Underlying values
    pub fn values(&self) -> &[f32; N_PITCH_CLASSES] {
        &self.0
    }

    /// Circularly rotate by `semitones`
    ///
    /// The value at pitch class `i` moves to `(i + semitones) mod 12`, so a
    /// template for C rotated by 7 becomes the template for G. Negative
    /// values rotate downward.
    pub fn rotate(&self, semitones: i32) -> Self {
        let shift = semitones.rem_euclid(N_PITCH_CLASSES as i32) as usize;
        let mut out = [0.0f32; N_PITCH_CLASSES];
        for (i, &v) in self.0.iter().enumerate() {
            out[(i + shift) % N_PITCH_CLASSES] = v;
        }
        Self(out)
    }

    /// True when every pitch class is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Index of the strongest pitch class (lowest index on ties)
    pub fn dominant_pitch_class(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.0.iter().enumerate() {
            if v > self.0[best] {
                best = i;
            }
        }
        best
    }
}

impl Default for PitchClassVector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl Index<usize> for PitchClassVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl From<[f32; N_PITCH_CLASSES]> for PitchClassVector {
    fn from(values: [f32; N_PITCH_CLASSES]) -> Self {
        Self(values)
    }
}

impl TryFrom<&[f32]> for PitchClassVector {
    type Error = AnalysisError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        Self::from_slice(values)
    }
}
