//! Chroma extraction front end
//!
//! Dispatches a [`ChromaConfig`] to the STFT, CQT or CENS implementation and
//! wraps the frames in a [`Chromagram`].

use super::cqt::{chroma_cqt, chroma_cqt_raw};
use super::normalization::{cens_quantize, normalize_l1, normalize_l2};
use super::smoothing::smooth_chroma;
use super::stft::chroma_stft;
use super::{ChromaType, Chromagram};
use crate::config::ChromaConfig;
use crate::error::AnalysisError;

/// Chroma feature extraction backend
pub trait ChromaExtractor: Send + Sync {
    /// Extract a chromagram from mono samples
    fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        config: &ChromaConfig,
    ) -> Result<Chromagram, AnalysisError>;

    /// Get the name of this extractor (for logging)
    fn name(&self) -> &'static str;
}

/// Built-in STFT / CQT / CENS chroma extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct SpectralChromaExtractor;

impl ChromaExtractor for SpectralChromaExtractor {
    fn extract(
        &self,
        samples: &[f32],
        sample_rate: u32,
        config: &ChromaConfig,
    ) -> Result<Chromagram, AnalysisError> {
        extract_chroma(samples, sample_rate, config)
    }

    fn name(&self) -> &'static str {
        "spectral"
    }
}

/// Extract a chromagram using the chroma family in `config`
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Chroma parameters
///
/// # Returns
///
/// Chromagram with `ceil(samples.len() / hop_size)` frames
///
/// # Errors
///
/// Returns `InvalidInput` for invalid parameters.
pub fn extract_chroma(
    samples: &[f32],
    sample_rate: u32,
    config: &ChromaConfig,
) -> Result<Chromagram, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }
    if config.hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    log::debug!(
        "Extracting {} chroma: {} samples at {} Hz",
        config.chroma_type,
        samples.len(),
        sample_rate
    );

    let frames = match config.chroma_type {
        ChromaType::Stft => chroma_stft(
            samples,
            sample_rate,
            config.frame_size,
            config.hop_size,
            config.tuning,
        )?,
        ChromaType::Cqt => chroma_cqt(
            samples,
            sample_rate,
            config.hop_size,
            config.fmin,
            config.n_octaves,
            config.bins_per_octave,
            config.tuning,
        )?,
        ChromaType::Cens => chroma_cens(samples, sample_rate, config)?,
    };

    Ok(Chromagram {
        frames,
        sample_rate,
        hop_size: config.hop_size,
        n_samples: samples.len(),
        time_offset: 0.0,
        chroma_type: config.chroma_type,
    })
}

/// Chroma Energy Normalized Statistics
///
/// 1. CQT chroma without normalization
/// 2. L1-normalize each frame
/// 3. Quantize with thresholds 0.4 / 0.2 / 0.1 / 0.05
/// 4. Hann-smooth over `cens_smoothing` frames
/// 5. L2-normalize each frame
///
/// # Reference
///
/// Müller, M., Kurth, F., & Clausen, M. (2005). Audio Matching via Chroma-Based Statistical
/// Features. *Proceedings of ISMIR*.
pub fn chroma_cens(
    samples: &[f32],
    sample_rate: u32,
    config: &ChromaConfig,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let mut chroma = chroma_cqt_raw(
        samples,
        sample_rate,
        config.hop_size,
        config.fmin,
        config.n_octaves,
        config.bins_per_octave,
        config.tuning,
    )?;

    for frame in chroma.iter_mut() {
        normalize_l1(frame);
        cens_quantize(frame);
    }

    let mut smoothed = smooth_chroma(&chroma, config.cens_smoothing);
    for frame in smoothed.iter_mut() {
        normalize_l2(frame);
    }

    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(chroma_type: ChromaType) -> ChromaConfig {
        ChromaConfig {
            chroma_type,
            fmin: 130.812_78,
            n_octaves: 4,
            bins_per_octave: 12,
            ..ChromaConfig::default()
        }
    }

    fn triad(sample_rate: u32, seconds: f32, freqs: &[f32]) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                freqs
                    .iter()
                    .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
                    * 0.2
            })
            .collect()
    }

    #[test]
    fn test_extract_all_types() {
        let samples = triad(22050, 1.0, &[261.63, 329.63, 392.0]);
        for chroma_type in [ChromaType::Stft, ChromaType::Cqt, ChromaType::Cens] {
            let chroma = extract_chroma(&samples, 22050, &test_config(chroma_type)).unwrap();
            assert_eq!(chroma.chroma_type, chroma_type);
            assert_eq!(chroma.n_frames(), samples.len().div_ceil(512));
            assert_eq!(chroma.n_samples, samples.len());
            assert!(chroma.frames.iter().all(|f| f.len() == 12));
            assert!(chroma.frames.iter().flatten().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_cens_unit_norm() {
        let samples = triad(22050, 1.0, &[220.0, 261.63, 329.63]);
        let frames = chroma_cens(&samples, 22050, &test_config(ChromaType::Cens)).unwrap();
        let mid = &frames[frames.len() / 2];
        let norm: f32 = mid.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
        // A minor triad: A, C, E dominate
        for &class in &[9usize, 0, 4] {
            assert!(mid[class] > mid[6]);
        }
    }

    #[test]
    fn test_extract_invalid() {
        let config = ChromaConfig {
            hop_size: 0,
            ..test_config(ChromaType::Stft)
        };
        assert!(extract_chroma(&[0.0; 1000], 22050, &config).is_err());
        assert!(extract_chroma(&[0.0; 1000], 0, &test_config(ChromaType::Stft)).is_err());
    }

    #[test]
    fn test_extractor_trait() {
        let extractor = SpectralChromaExtractor;
        let samples = triad(22050, 0.5, &[440.0]);
        let chroma = extractor
            .extract(&samples, 22050, &test_config(ChromaType::Stft))
            .unwrap();
        assert_eq!(extractor.name(), "spectral");
        assert_eq!(chroma.sample_rate, 22050);
    }
}
