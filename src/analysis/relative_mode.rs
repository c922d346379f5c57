//! Relative mode estimation
//!
//! Runs the tonal fragment estimator twice over the same audio, under two
//! named chroma configurations, and hands both results back for comparison.
//! Nothing is merged: how the two `tondeltamax` values relate is up to the
//! caller.

use crate::analysis::result::{RelativeModeResult, TonalFragment};
use crate::config::{FragmentConfig, RelativeModeConfig};
use crate::error::AnalysisError;
use crate::features::chroma::{ChromaExtractor, SpectralChromaExtractor};
use crate::features::key::{estimate_with_templates, ProfileTemplates, TemplateBank};
use crate::preprocessing::crop::slice_seconds;

/// Estimate relative mode with the default branches (CQT vs STFT chroma)
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `profile` - Built-in template profile name (e.g. "simple")
///
/// # Returns
///
/// `(primary, comparison)` fragment estimates
///
/// # Errors
///
/// - `UnknownProfile` before any audio is touched
/// - `DegenerateInput` for silent audio
/// - `InvalidInput` / `InsufficientAudio` for unusable audio
pub fn relative_mode(
    samples: &[f32],
    sample_rate: u32,
    profile: &str,
) -> Result<(TonalFragment, TonalFragment), AnalysisError> {
    let config = RelativeModeConfig::with_profile(profile);
    relative_mode_with(
        samples,
        sample_rate,
        &config,
        TemplateBank::builtin(),
        &SpectralChromaExtractor,
    )
    .map(RelativeModeResult::into_pair)
}

/// Estimate relative mode with explicit branches, templates and extractor
///
/// The primary branch is estimated first, then the comparison branch. Each
/// branch slices its own time range and extracts its own chroma.
pub fn relative_mode_with(
    samples: &[f32],
    sample_rate: u32,
    config: &RelativeModeConfig,
    bank: &TemplateBank,
    extractor: &dyn ChromaExtractor,
) -> Result<RelativeModeResult, AnalysisError> {
    let templates = bank.get_profile(&config.profile)?;

    log::debug!(
        "Relative mode: {} samples at {} Hz, profile '{}', branches '{}' vs '{}' ({})",
        samples.len(),
        sample_rate,
        config.profile,
        config.primary.label,
        config.comparison.label,
        extractor.name()
    );

    let primary = estimate_branch(samples, sample_rate, &config.primary, templates, extractor)?;
    let comparison =
        estimate_branch(samples, sample_rate, &config.comparison, templates, extractor)?;

    log::debug!(
        "Relative mode: {} tondeltamax={:.4}, {} tondeltamax={:.4}",
        config.primary.label,
        primary.tondeltamax,
        config.comparison.label,
        comparison.tondeltamax
    );

    Ok(RelativeModeResult {
        primary_label: config.primary.label.clone(),
        primary,
        comparison_label: config.comparison.label.clone(),
        comparison,
    })
}

fn estimate_branch(
    samples: &[f32],
    sample_rate: u32,
    branch: &FragmentConfig,
    templates: &ProfileTemplates,
    extractor: &dyn ChromaExtractor,
) -> Result<TonalFragment, AnalysisError> {
    let fragment = slice_seconds(samples, sample_rate, branch.start, branch.end)?;
    let chroma = extractor.extract(fragment, sample_rate, &branch.chroma)?;
    estimate_with_templates(&chroma.frames, templates)
}
