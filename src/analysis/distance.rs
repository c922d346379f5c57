//! Distances between aggregate pitch-class vectors
//!
//! Used to measure how far the tonal content moves from one analysis window
//! to the next.

use crate::error::AnalysisError;
use crate::features::chroma::PitchClassVector;
use crate::features::key::pearson;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const EPSILON: f64 = 1e-12;

/// Distance metric between consecutive windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// `1 - cos(a, b)`
    Cosine,
    /// Euclidean (L2) distance
    Euclidean,
    /// Manhattan (L1) distance
    Cityblock,
    /// `1 - pearson(a, b)`
    Correlation,
    /// Largest absolute per-class difference (L-infinity)
    Chebyshev,
}

impl DistanceMetric {
    /// Every supported metric
    pub const ALL: [DistanceMetric; 5] = [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Cityblock,
        DistanceMetric::Correlation,
        DistanceMetric::Chebyshev,
    ];

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Cityblock => "cityblock",
            DistanceMetric::Correlation => "correlation",
            DistanceMetric::Chebyshev => "chebyshev",
        }
    }

    /// Distance between two pitch-class vectors
    ///
    /// # Errors
    ///
    /// - `DegenerateInput` for cosine distance with a zero vector, or
    ///   correlation distance with a constant vector
    /// - `NumericalError` if the result is not finite
    pub fn compute(
        &self,
        a: &PitchClassVector,
        b: &PitchClassVector,
    ) -> Result<f32, AnalysisError> {
        let pairs = a.values().iter().zip(b.values().iter());

        let d = match self {
            DistanceMetric::Cosine => {
                let mut dot = 0.0f64;
                let mut norm_a = 0.0f64;
                let mut norm_b = 0.0f64;
                for (&x, &y) in pairs {
                    dot += x as f64 * y as f64;
                    norm_a += x as f64 * x as f64;
                    norm_b += y as f64 * y as f64;
                }
                if norm_a <= EPSILON || norm_b <= EPSILON {
                    return Err(AnalysisError::DegenerateInput(
                        "Cosine distance is undefined for a zero vector".to_string(),
                    ));
                }
                // Clamp so identical vectors give exactly 0 despite rounding
                (1.0 - (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)).max(0.0)
            }
            DistanceMetric::Euclidean => pairs
                .map(|(&x, &y)| (x as f64 - y as f64).powi(2))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Cityblock => pairs.map(|(&x, &y)| (x as f64 - y as f64).abs()).sum(),
            DistanceMetric::Correlation => 1.0 - pearson(a, b)? as f64,
            DistanceMetric::Chebyshev => pairs
                .map(|(&x, &y)| (x as f64 - y as f64).abs())
                .fold(0.0, f64::max),
        };

        if !d.is_finite() {
            return Err(AnalysisError::NumericalError(format!(
                "{} distance is not finite: {}",
                self.name(),
                d
            )));
        }

        Ok(d as f32)
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "cityblock" | "manhattan" => Ok(DistanceMetric::Cityblock),
            "correlation" => Ok(DistanceMetric::Correlation),
            "chebyshev" => Ok(DistanceMetric::Chebyshev),
            other => Err(AnalysisError::InvalidInput(format!(
                "Unknown distance metric '{}' (expected one of: cosine, euclidean, cityblock, correlation, chebyshev)",
                other
            ))),
        }
    }
}
