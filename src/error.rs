//! Error types for relative mode estimation

use std::fmt;

/// Errors that can occur during relative mode estimation
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Requested template profile is not registered
    UnknownProfile(String),

    /// Pitch-class vector does not have exactly 12 elements
    InvalidShape(String),

    /// Input carries no tonal information (zero energy or zero variance)
    DegenerateInput(String),

    /// Not enough audio for the requested window/crop
    InsufficientAudio(String),

    /// Invalid input parameters
    InvalidInput(String),

    /// Audio decoding error
    DecodingError(String),

    /// Numerical error (overflow, non-finite result, etc.)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::UnknownProfile(msg) => write!(f, "Unknown profile: {}", msg),
            AnalysisError::InvalidShape(msg) => write!(f, "Invalid shape: {}", msg),
            AnalysisError::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
            AnalysisError::InsufficientAudio(msg) => write!(f, "Insufficient audio: {}", msg),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
