//! Pearson correlation between pitch-class vectors

use crate::error::AnalysisError;
use crate::features::chroma::{PitchClassVector, N_PITCH_CLASSES};

/// Variance floor below which a vector is treated as constant
const EPSILON: f64 = 1e-12;

/// Pearson correlation coefficient between two pitch-class vectors
///
/// Accumulates in `f64`. The result is in `[-1, 1]`.
///
/// # Errors
///
/// Returns `DegenerateInput` if either vector has zero variance (this covers
/// the all-zero vector), since the coefficient is undefined there.
pub fn pearson(a: &PitchClassVector, b: &PitchClassVector) -> Result<f32, AnalysisError> {
    let n = N_PITCH_CLASSES as f64;
    let mean_a = a.values().iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_b = b.values().iter().map(|&x| x as f64).sum::<f64>() / n;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    for (&x, &y) in a.values().iter().zip(b.values().iter()) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a <= EPSILON || var_b <= EPSILON {
        return Err(AnalysisError::DegenerateInput(
            "Pitch-class vector has no variance; correlation is undefined".to_string(),
        ));
    }

    let r = cov / (var_a.sqrt() * var_b.sqrt());
    if !r.is_finite() {
        return Err(AnalysisError::NumericalError(format!(
            "Correlation is not finite: {}",
            r
        )));
    }

    Ok(r.clamp(-1.0, 1.0) as f32)
}

/// Correlate `chroma` against `template` rotated to each of the 12 tonics
///
/// Entry `r` is the correlation with the template whose tonic is pitch class `r`.
pub fn rotation_correlations(
    chroma: &PitchClassVector,
    template: &PitchClassVector,
) -> Result<[f32; N_PITCH_CLASSES], AnalysisError> {
    let mut out = [0.0f32; N_PITCH_CLASSES];
    for (r, slot) in out.iter_mut().enumerate() {
        *slot = pearson(&template.rotate(r as i32), chroma)?;
    }
    Ok(out)
}
