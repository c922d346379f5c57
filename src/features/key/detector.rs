//! Tonal fragment estimation
//!
//! Correlates a fragment's aggregate chroma against a profile's major and
//! minor templates at all 12 rotations, then reports the best major key, the
//! best minor key and their difference (`tondeltamax`).
//!
//! # Algorithm
//!
//! 1. Average chroma frames into one 12-bin vector (mean across frames)
//! 2. For each tonic r in 0..12, Pearson-correlate the vector with the major and
//!    minor templates rotated by r semitones
//! 3. Pick the best rotation per mode (lowest tonic wins an exact tie)
//! 4. `tondeltamax = best_major - best_minor`
//!
//! # Reference
//!
//! Krumhansl, C. L. (1990). *Cognitive Foundations of Musical Pitch*. Oxford University Press.
//! (Krumhansl-Schmuckler key-finding algorithm.)

use super::correlation::rotation_correlations;
use super::templates::{ProfileTemplates, TemplateBank};
use crate::analysis::result::{Key, KeyFitScore, TonalFragment};
use crate::error::AnalysisError;
use crate::features::chroma::{PitchClassVector, N_PITCH_CLASSES};

/// A runner-up key is reported when its correlation exceeds this share of the best
const ALT_KEY_RATIO: f32 = 0.9;

/// Estimate the tonal fragment of a chroma matrix
///
/// # Arguments
///
/// * `chroma_vectors` - 12-element chroma vectors (one per frame)
/// * `profile` - Name of a profile registered in `bank`
/// * `bank` - Template bank
///
/// # Errors
///
/// - `UnknownProfile` if `profile` is not in the bank (checked before any computation)
/// - `InvalidShape` if a frame does not have 12 elements
/// - `DegenerateInput` if there are no frames or the aggregate has no variance
///
/// # Example
///
/// ```
/// use relative_mode::features::key::{estimate, TemplateBank, TemplateSet};
///
/// let c_major = TemplateSet::Simple.major();
/// let frames = vec![c_major.values().to_vec(); 4];
/// let fragment = estimate(&frames, "simple", TemplateBank::builtin())?;
///
/// assert_eq!(fragment.best_major.tonic, 0);
/// assert!(fragment.tondeltamax > 0.0);
/// # Ok::<(), relative_mode::AnalysisError>(())
/// ```
pub fn estimate(
    chroma_vectors: &[Vec<f32>],
    profile: &str,
    bank: &TemplateBank,
) -> Result<TonalFragment, AnalysisError> {
    let templates = bank.get_profile(profile)?;
    estimate_with_templates(chroma_vectors, templates)
}

/// Estimate from chroma frames with already resolved templates
pub fn estimate_with_templates(
    chroma_vectors: &[Vec<f32>],
    templates: &ProfileTemplates,
) -> Result<TonalFragment, AnalysisError> {
    log::debug!(
        "Estimating tonal fragment from {} chroma vectors (profile '{}')",
        chroma_vectors.len(),
        templates.name
    );

    let aggregate = PitchClassVector::mean_of(chroma_vectors)?;
    estimate_vector(&aggregate, templates)
}

/// Estimate from a single (already aggregated) pitch-class vector
pub fn estimate_vector(
    chroma: &PitchClassVector,
    templates: &ProfileTemplates,
) -> Result<TonalFragment, AnalysisError> {
    if chroma.is_zero() {
        return Err(AnalysisError::DegenerateInput(
            "Pitch-class vector has zero energy".to_string(),
        ));
    }
    if chroma.values().iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidInput(
            "Pitch-class vector contains a non-finite value".to_string(),
        ));
    }

    let major_correlations = rotation_correlations(chroma, &templates.major)?;
    let minor_correlations = rotation_correlations(chroma, &templates.minor)?;

    let best_major = best_rotation(&major_correlations);
    let best_minor = best_rotation(&minor_correlations);
    let tondeltamax = best_major.correlation - best_minor.correlation;

    // Major wins an exact tie
    let (key, best_correlation) = if best_major.correlation >= best_minor.correlation {
        (Key::Major(best_major.tonic), best_major.correlation)
    } else {
        (Key::Minor(best_minor.tonic), best_minor.correlation)
    };

    let alt_key = alternative_key(
        key,
        best_correlation,
        &major_correlations,
        &minor_correlations,
    );

    log::debug!(
        "Tonal fragment: key {}, r={:.4}, best major {} ({:.4}), best minor {} ({:.4}), tondeltamax={:.4}",
        key,
        best_correlation,
        Key::Major(best_major.tonic).name(),
        best_major.correlation,
        Key::Minor(best_minor.tonic).name(),
        best_minor.correlation,
        tondeltamax
    );

    Ok(TonalFragment {
        profile: templates.name.clone(),
        chroma: *chroma,
        major_correlations,
        minor_correlations,
        best_major,
        best_minor,
        key,
        best_correlation,
        alt_key,
        tondeltamax,
    })
}

/// Highest correlation; strict comparison keeps the lowest tonic on ties
fn best_rotation(correlations: &[f32; N_PITCH_CLASSES]) -> KeyFitScore {
    let mut best = KeyFitScore {
        tonic: 0,
        correlation: correlations[0],
    };
    for (tonic, &corr) in correlations.iter().enumerate().skip(1) {
        if corr > best.correlation {
            best = KeyFitScore {
                tonic: tonic as u32,
                correlation: corr,
            };
        }
    }
    best
}

/// Strongest key other than `best` within `ALT_KEY_RATIO` of its correlation
fn alternative_key(
    best: Key,
    best_correlation: f32,
    major_correlations: &[f32; N_PITCH_CLASSES],
    minor_correlations: &[f32; N_PITCH_CLASSES],
) -> Option<(Key, f32)> {
    if best_correlation <= 0.0 {
        return None;
    }
    let threshold = best_correlation * ALT_KEY_RATIO;

    let candidates = major_correlations
        .iter()
        .enumerate()
        .map(|(i, &c)| (Key::Major(i as u32), c))
        .chain(
            minor_correlations
                .iter()
                .enumerate()
                .map(|(i, &c)| (Key::Minor(i as u32), c)),
        );

    let mut alt: Option<(Key, f32)> = None;
    for (key, corr) in candidates {
        if key == best || corr <= threshold {
            continue;
        }
        if alt.map_or(true, |(_, c)| corr > c) {
            alt = Some((key, corr));
        }
    }
    alt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::key::templates::TemplateSet;

    fn frames_of(v: &PitchClassVector, n: usize) -> Vec<Vec<f32>> {
        vec![v.values().to_vec(); n]
    }

    #[test]
    fn test_estimate_empty() {
        let result = estimate(&[], "simple", TemplateBank::builtin());
        assert!(matches!(result, Err(AnalysisError::DegenerateInput(_))));
    }

    #[test]
    fn test_estimate_wrong_dimensions() {
        let frames = vec![vec![0.5f32; 10]];
        let result = estimate(&frames, "simple", TemplateBank::builtin());
        assert!(matches!(result, Err(AnalysisError::InvalidShape(_))));
    }

    #[test]
    fn test_estimate_zero_vector() {
        let frames = vec![vec![0.0f32; 12]; 8];
        let result = estimate(&frames, "albrecht", TemplateBank::builtin());
        assert!(matches!(result, Err(AnalysisError::DegenerateInput(_))));
    }

    #[test]
    fn test_estimate_unknown_profile() {
        let frames = vec![vec![0.0f32; 12]];
        // Profile lookup comes first, so the degenerate frame is never examined
        let result = estimate(&frames, "nope", TemplateBank::builtin());
        assert!(matches!(result, Err(AnalysisError::UnknownProfile(_))));
    }

    #[test]
    fn test_simple_major_template_is_major() {
        let major = TemplateSet::Simple.major();
        let fragment = estimate(&frames_of(&major, 3), "simple", TemplateBank::builtin()).unwrap();

        assert_eq!(fragment.best_major.tonic, 0);
        assert!((fragment.best_major.correlation - 1.0).abs() < 1e-6);
        assert!(fragment.tondeltamax > 0.0);
        assert_eq!(fragment.key, Key::Major(0));
    }

    #[test]
    fn test_simple_minor_template_is_minor() {
        let minor = TemplateSet::Simple.minor();
        let fragment = estimate(&frames_of(&minor, 3), "simple", TemplateBank::builtin()).unwrap();

        assert_eq!(fragment.best_minor.tonic, 0);
        assert!((fragment.best_minor.correlation - 1.0).abs() < 1e-6);
        assert!(fragment.tondeltamax < 0.0);
        assert_eq!(fragment.key, Key::Minor(0));
    }

    #[test]
    fn test_transposed_keys_found() {
        let bank = TemplateBank::builtin();
        for tonic in 0..12u32 {
            let profile = bank.get_profile("krumhansl").unwrap();
            let major = profile.major_for(tonic);
            let fragment = estimate_vector(&major, profile).unwrap();
            assert_eq!(fragment.best_major.tonic, tonic);
            assert_eq!(fragment.key, Key::Major(tonic));

            let minor = profile.minor_for(tonic);
            let fragment = estimate_vector(&minor, profile).unwrap();
            assert_eq!(fragment.best_minor.tonic, tonic);
            assert_eq!(fragment.key, Key::Minor(tonic));
        }
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let frames: Vec<Vec<f32>> = (0..16)
            .map(|i| (0..12).map(|j| ((i * 7 + j * 5) % 11) as f32 * 0.1).collect())
            .collect();
        let bank = TemplateBank::builtin();
        let a = estimate(&frames, "albrecht", bank).unwrap();
        let b = estimate(&frames, "albrecht", bank).unwrap();
        assert_eq!(a.tondeltamax.to_bits(), b.tondeltamax.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_best_rotation_tie_breaks_low() {
        let mut corrs = [0.1f32; 12];
        corrs[3] = 0.8;
        corrs[8] = 0.8;
        let best = best_rotation(&corrs);
        assert_eq!(best.tonic, 3);
        assert_eq!(best.correlation, 0.8);

        let flat = best_rotation(&[0.5f32; 12]);
        assert_eq!(flat.tonic, 0);
    }

    #[test]
    fn test_tondeltamax_is_difference() {
        let chroma = PitchClassVector::new([
            0.9, 0.1, 0.4, 0.05, 0.7, 0.3, 0.1, 0.8, 0.05, 0.35, 0.1, 0.2,
        ]);
        let profile = TemplateBank::builtin().get_profile("temperley").unwrap();
        let fragment = estimate_vector(&chroma, profile).unwrap();
        let expected = fragment.best_major.correlation - fragment.best_minor.correlation;
        assert_eq!(fragment.tondeltamax, expected);
        assert_eq!(
            fragment.best_major.correlation,
            fragment.major_correlations.iter().cloned().fold(f32::MIN, f32::max)
        );
    }

    #[test]
    fn test_alt_key_is_relative_minor() {
        // C major triad plus A: relative minor should be a close runner-up
        let mut values = [0.0f32; 12];
        values[0] = 1.0;
        values[4] = 1.0;
        values[7] = 1.0;
        values[9] = 0.9;
        let chroma = PitchClassVector::new(values);
        let profile = TemplateBank::builtin().get_profile("krumhansl").unwrap();
        let fragment = estimate_vector(&chroma, profile).unwrap();

        if let Some((alt, corr)) = fragment.alt_key {
            assert_ne!(alt, fragment.key);
            assert!(corr > fragment.best_correlation * ALT_KEY_RATIO);
            assert!(corr <= fragment.best_correlation);
        }
    }

    #[test]
    fn test_alt_key_absent_for_clear_key() {
        let profile = TemplateBank::builtin().get_profile("simple").unwrap();
        let fragment = estimate_vector(&profile.major, profile).unwrap();
        // Every other key sits well below r = 0.9
        assert!(fragment.alt_key.is_none());
    }
}
