//! Relative mode estimation across time
//!
//! Slides a fixed-length window over a recording, estimates a tonal fragment
//! per window and measures how far the aggregate chroma moves between
//! consecutive windows.
//!
//! # Algorithm
//!
//! 1. Crop `crop_start` / `crop_end` seconds off the recording
//! 2. Extract one chromagram for the whole cropped recording
//! 3. Lay windows out on the sample grid: `win = round(window_length * sr)`,
//!    `hop = round(hop_length * sr)`, `floor((N - win) / hop) + 1` windows.
//!    A trailing partial window is dropped.
//! 4. Estimate each window from the chroma frames it covers
//! 5. Distance between each window's aggregate chroma and its predecessor's
//!    (the first window has none)

use crate::analysis::distance::DistanceMetric;
use crate::analysis::result::{TimeSeries, TimeSeriesPoint, TonalFragment};
use crate::config::RmeConfig;
use crate::error::AnalysisError;
use crate::features::chroma::{
    ChromaExtractor, Chromagram, PitchClassVector, SpectralChromaExtractor,
};
use crate::features::key::{estimate_with_templates, ProfileTemplates, TemplateBank};
use crate::io::decoder::decode_audio;
use crate::preprocessing::crop::{crop_seconds, seconds_to_samples};
use std::path::Path;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sample and frame extent of one analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowSpan {
    index: usize,
    start_sample: usize,
    end_sample: usize,
    start_frame: usize,
    end_frame: usize,
}

/// Estimate relative mode across time with the built-in bank and extractor
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Windowing, chroma, profile and distance settings
///
/// # Errors
///
/// - `UnknownProfile` before any audio is touched
/// - `InvalidInput` for non-positive window or hop lengths
/// - `InsufficientAudio` if the cropped recording is empty or shorter than one window
/// - `DegenerateInput` if any window has no usable chroma (e.g. silence)
pub fn rme_across_time(
    samples: &[f32],
    sample_rate: u32,
    config: &RmeConfig,
) -> Result<TimeSeries, AnalysisError> {
    rme_across_time_with(
        samples,
        sample_rate,
        config,
        TemplateBank::builtin(),
        &SpectralChromaExtractor,
    )
}

/// Decode an audio file and estimate relative mode across time
///
/// # Errors
///
/// `DecodingError` if the file cannot be read, otherwise as [`rme_across_time`].
pub fn rme_across_time_file<P: AsRef<Path>>(
    path: P,
    config: &RmeConfig,
) -> Result<TimeSeries, AnalysisError> {
    TemplateBank::builtin().get_profile(&config.profile)?;
    let audio = decode_audio(path)?;
    rme_across_time(&audio.samples, audio.sample_rate, config)
}

/// Estimate relative mode across time with explicit templates and extractor
pub fn rme_across_time_with(
    samples: &[f32],
    sample_rate: u32,
    config: &RmeConfig,
    bank: &TemplateBank,
    extractor: &dyn ChromaExtractor,
) -> Result<TimeSeries, AnalysisError> {
    let templates = bank.get_profile(&config.profile)?;
    check_lengths(config.window_length, config.hop_length)?;

    log::debug!(
        "RME across time: {} samples at {} Hz, window={:.2}s hop={:.2}s, crop {:.2}s/{:.2}s, {} chroma, profile '{}', {} distance",
        samples.len(),
        sample_rate,
        config.window_length,
        config.hop_length,
        config.crop_start,
        config.crop_end,
        config.chroma.chroma_type,
        config.profile,
        config.distance
    );

    let cropped = crop_seconds(samples, sample_rate, config.crop_start, config.crop_end)?;

    let window_samples = seconds_to_samples(config.window_length, sample_rate);
    if window_samples > cropped.len() {
        return Err(AnalysisError::InsufficientAudio(format!(
            "Window of {:.2}s is longer than the {:.2}s of cropped audio",
            config.window_length,
            cropped.len() as f32 / sample_rate as f32
        )));
    }

    let mut chromagram = extractor.extract(cropped, sample_rate, &config.chroma)?;
    chromagram.time_offset =
        seconds_to_samples(config.crop_start, sample_rate) as f32 / sample_rate as f32;

    windowed_estimates(
        chromagram,
        config.window_length,
        config.hop_length,
        templates,
        config.distance,
    )
}

/// Estimate every window of an already extracted chromagram
///
/// Windows are laid out on the chromagram's sample grid; window `i` covers
/// samples `[i * hop, i * hop + win)` and the chroma frames
/// `[floor(start / hop_size), ceil(end / hop_size))`. Start times are
/// reported relative to the chromagram's `time_offset`.
///
/// # Errors
///
/// - `InvalidInput` if a length is not positive or rounds to zero samples
/// - `InsufficientAudio` if the chromagram is empty or shorter than one window
/// - `DegenerateInput` naming the first window whose chroma is unusable
pub fn windowed_estimates(
    chromagram: Chromagram,
    window_length: f32,
    hop_length: f32,
    templates: &ProfileTemplates,
    distance: DistanceMetric,
) -> Result<TimeSeries, AnalysisError> {
    let spans = window_spans(&chromagram, window_length, hop_length)?;

    log::debug!(
        "Estimating {} windows over {} chroma frames ({:.2}s)",
        spans.len(),
        chromagram.n_frames(),
        chromagram.duration()
    );

    #[cfg(feature = "parallel")]
    let fragments: Vec<TonalFragment> = spans
        .par_iter()
        .map(|span| estimate_window(&chromagram, span, templates))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(not(feature = "parallel"))]
    let fragments: Vec<TonalFragment> = spans
        .iter()
        .map(|span| estimate_window(&chromagram, span, templates))
        .collect::<Result<Vec<_>, _>>()?;

    // Distances are taken in window order once every window is estimated
    let mut points = Vec::with_capacity(fragments.len());
    let mut previous: Option<PitchClassVector> = None;
    for (span, fragment) in spans.iter().zip(fragments) {
        let distance_to_previous = previous
            .map(|prev| distance.compute(&prev, &fragment.chroma))
            .transpose()?;
        previous = Some(fragment.chroma);

        points.push(TimeSeriesPoint {
            start_time: chromagram.time_offset
                + span.start_sample as f32 / chromagram.sample_rate as f32,
            end_time: chromagram.time_offset
                + span.end_sample as f32 / chromagram.sample_rate as f32,
            start_frame: span.start_frame,
            end_frame: span.end_frame,
            tondeltamax: fragment.tondeltamax,
            distance: distance_to_previous,
            fragment,
        });
    }

    log::debug!(
        "RME across time: {} windows, tondeltamax range [{:.4}, {:.4}]",
        points.len(),
        points
            .iter()
            .map(|p| p.tondeltamax)
            .fold(f32::INFINITY, f32::min),
        points
            .iter()
            .map(|p| p.tondeltamax)
            .fold(f32::NEG_INFINITY, f32::max)
    );

    Ok(TimeSeries { points, chromagram })
}

fn check_lengths(window_length: f32, hop_length: f32) -> Result<(), AnalysisError> {
    for (name, value) in [("Window length", window_length), ("Hop length", hop_length)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "{} must be a positive number of seconds, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

fn window_spans(
    chromagram: &Chromagram,
    window_length: f32,
    hop_length: f32,
) -> Result<Vec<WindowSpan>, AnalysisError> {
    check_lengths(window_length, hop_length)?;
    if chromagram.sample_rate == 0 || chromagram.hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Chromagram has a zero sample rate or hop size".to_string(),
        ));
    }

    let sr = chromagram.sample_rate;
    let win = seconds_to_samples(window_length, sr);
    let hop = seconds_to_samples(hop_length, sr);
    if win == 0 || hop == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Window ({}s) and hop ({}s) must each span at least one sample at {} Hz",
            window_length, hop_length, sr
        )));
    }

    let n_samples = chromagram.n_samples;
    let n_frames = chromagram.n_frames();
    if n_samples == 0 || n_frames == 0 {
        return Err(AnalysisError::InsufficientAudio(
            "No audio to analyze".to_string(),
        ));
    }
    if win > n_samples {
        return Err(AnalysisError::InsufficientAudio(format!(
            "Window of {:.2}s is longer than the {:.2}s of audio",
            window_length,
            chromagram.duration()
        )));
    }

    let count = (n_samples - win) / hop + 1;
    let spans = (0..count)
        .map(|index| {
            let start_sample = index * hop;
            let end_sample = start_sample + win;
            let start_frame = (start_sample / chromagram.hop_size).min(n_frames);
            let end_frame = end_sample
                .div_ceil(chromagram.hop_size)
                .clamp(start_frame, n_frames);
            WindowSpan {
                index,
                start_sample,
                end_sample,
                start_frame,
                end_frame,
            }
        })
        .collect();

    Ok(spans)
}

fn estimate_window(
    chromagram: &Chromagram,
    span: &WindowSpan,
    templates: &ProfileTemplates,
) -> Result<TonalFragment, AnalysisError> {
    let frames = &chromagram.frames[span.start_frame..span.end_frame];
    estimate_with_templates(frames, templates).map_err(|e| match e {
        AnalysisError::DegenerateInput(msg) => AnalysisError::DegenerateInput(format!(
            "Window {} ({:.2}s): {}",
            span.index,
            chromagram.time_offset + span.start_sample as f32 / chromagram.sample_rate as f32,
            msg
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChromaConfig;
    use crate::features::chroma::ChromaType;
    use crate::features::key::estimate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SR: u32 = 22050;
    const HOP: usize = 512;

    const C_MAJOR_SCALE: [f32; 12] = [1.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];

    fn constant_chromagram(seconds: f32, frame: &[f32]) -> Chromagram {
        let n_samples = (seconds * SR as f32).round() as usize;
        let n_frames = n_samples.div_ceil(HOP);
        let mut chroma =
            Chromagram::from_frames(vec![frame.to_vec(); n_frames], SR, HOP, ChromaType::Cens);
        chroma.n_samples = n_samples;
        chroma
    }

    fn albrecht() -> &'static ProfileTemplates {
        TemplateBank::builtin().get_profile("albrecht").unwrap()
    }

    #[test]
    fn test_window_count_30s() {
        let chroma = constant_chromagram(30.0, &C_MAJOR_SCALE);
        let series =
            windowed_estimates(chroma, 3.0, 3.0, albrecht(), DistanceMetric::Cosine).unwrap();
        assert_eq!(series.len(), 10);
        assert!((series.points[9].start_time - 27.0).abs() < 1e-4);
        assert!((series.points[9].end_time - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_partial_window_dropped() {
        let chroma = constant_chromagram(31.5, &C_MAJOR_SCALE);
        let series =
            windowed_estimates(chroma, 3.0, 3.0, albrecht(), DistanceMetric::Cosine).unwrap();
        assert_eq!(series.len(), 10);
    }

    #[test]
    fn test_overlapping_windows() {
        let chroma = constant_chromagram(30.0, &C_MAJOR_SCALE);
        let series =
            windowed_estimates(chroma, 3.0, 1.5, albrecht(), DistanceMetric::Euclidean).unwrap();
        assert_eq!(series.len(), 19);
        let starts = series.start_times();
        assert!(starts.windows(2).all(|w| w[1] > w[0]));
        assert!((starts[1] - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_constant_audio_zero_distance() {
        for metric in [DistanceMetric::Cosine, DistanceMetric::Euclidean] {
            let chroma = constant_chromagram(12.0, &C_MAJOR_SCALE);
            let series = windowed_estimates(chroma, 3.0, 3.0, albrecht(), metric).unwrap();
            let distances = series.distances();
            assert_eq!(distances[0], None);
            for d in &distances[1..] {
                let d = d.unwrap();
                assert!(d.abs() < 1e-6, "{} distance was {}", metric, d);
            }
        }
    }

    #[test]
    fn test_single_window_matches_estimate() {
        let frames: Vec<Vec<f32>> = (0..100)
            .map(|i| {
                let mut frame = C_MAJOR_SCALE.to_vec();
                frame[(i * 7) % 12] += 0.5;
                frame
            })
            .collect();
        let direct = estimate(&frames, "albrecht", TemplateBank::builtin()).unwrap();

        let chroma = Chromagram::from_frames(frames, SR, HOP, ChromaType::Cqt);
        let duration = chroma.duration();
        let series =
            windowed_estimates(chroma, duration, duration, albrecht(), DistanceMetric::Cosine)
                .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].start_frame, 0);
        assert_eq!(series.points[0].end_frame, 100);
        assert_eq!(series.points[0].tondeltamax, direct.tondeltamax);
        assert_eq!(series.points[0].distance, None);
    }

    #[test]
    fn test_time_offset_applied() {
        let mut chroma = constant_chromagram(9.0, &C_MAJOR_SCALE);
        chroma.time_offset = 2.0;
        let series =
            windowed_estimates(chroma, 3.0, 3.0, albrecht(), DistanceMetric::Cosine).unwrap();
        let starts = series.start_times();
        assert!((starts[0] - 2.0).abs() < 1e-4);
        assert!((starts[1] - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_window_longer_than_audio() {
        let chroma = constant_chromagram(2.0, &C_MAJOR_SCALE);
        let result = windowed_estimates(chroma, 3.0, 3.0, albrecht(), DistanceMetric::Cosine);
        assert!(matches!(result, Err(AnalysisError::InsufficientAudio(_))));
    }

    #[test]
    fn test_invalid_lengths() {
        for (win, hop) in [(0.0, 1.0), (1.0, 0.0), (-1.0, 1.0), (f32::NAN, 1.0)] {
            let chroma = constant_chromagram(5.0, &C_MAJOR_SCALE);
            let result = windowed_estimates(chroma, win, hop, albrecht(), DistanceMetric::Cosine);
            assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_silent_window_fails_series() {
        let mut chroma = constant_chromagram(9.0, &C_MAJOR_SCALE);
        let n = chroma.n_frames();
        // Covers every frame of the second window
        for frame in &mut chroma.frames[n / 3 - 5..2 * n / 3 + 5] {
            frame.iter_mut().for_each(|v| *v = 0.0);
        }
        let result = windowed_estimates(chroma, 3.0, 3.0, albrecht(), DistanceMetric::Cosine);
        match result {
            Err(AnalysisError::DegenerateInput(msg)) => assert!(msg.contains("Window 1")),
            other => panic!("expected DegenerateInput, got {:?}", other),
        }
    }

    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl ChromaExtractor for CountingExtractor {
        fn extract(
            &self,
            samples: &[f32],
            sample_rate: u32,
            config: &ChromaConfig,
        ) -> Result<Chromagram, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = samples.len().div_ceil(config.hop_size);
            let mut chroma = Chromagram::from_frames(
                vec![C_MAJOR_SCALE.to_vec(); n],
                sample_rate,
                config.hop_size,
                config.chroma_type,
            );
            chroma.n_samples = samples.len();
            Ok(chroma)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_unknown_profile_no_side_effects() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
        };
        let bank = TemplateBank::with_builtin_profiles();
        let before = bank.clone();
        let config = RmeConfig {
            profile: "nonexistent".to_string(),
            ..RmeConfig::default()
        };

        let result = rme_across_time_with(&vec![0.1; SR as usize * 6], SR, &config, &bank, &extractor);

        assert!(matches!(result, Err(AnalysisError::UnknownProfile(_))));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(bank, before);
    }

    #[test]
    fn test_cropping_and_start_times() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
        };
        let config = RmeConfig {
            crop_start: 2.0,
            crop_end: 1.0,
            ..RmeConfig::default()
        };

        // 15s - 3s of crops = 12s = 4 windows
        let series = rme_across_time_with(
            &vec![0.1; SR as usize * 15],
            SR,
            &config,
            TemplateBank::builtin(),
            &extractor,
        )
        .unwrap();

        assert_eq!(series.len(), 4);
        assert!((series.points[0].start_time - 2.0).abs() < 1e-4);
        assert!((series.points[3].start_time - 11.0).abs() < 1e-4);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cropped_audio_too_short() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
        };
        let config = RmeConfig {
            crop_start: 2.0,
            ..RmeConfig::default()
        };
        let result = rme_across_time_with(
            &vec![0.1; SR as usize * 4],
            SR,
            &config,
            TemplateBank::builtin(),
            &extractor,
        );
        assert!(matches!(result, Err(AnalysisError::InsufficientAudio(_))));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_crops_longer_than_audio() {
        let extractor = CountingExtractor {
            calls: AtomicUsize::new(0),
        };
        let config = RmeConfig {
            crop_start: 1e20,
            crop_end: 1e20,
            ..RmeConfig::default()
        };
        let result = rme_across_time_with(
            &vec![0.1; SR as usize * 6],
            SR,
            &config,
            TemplateBank::builtin(),
            &extractor,
        );
        assert!(matches!(result, Err(AnalysisError::InsufficientAudio(_))));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cens_major_to_minor() {
        // C major triad for 2s, then A minor triad for 2s
        let n = SR as usize * 2;
        let samples: Vec<f32> = (0..2 * n)
            .map(|i| {
                let t = i as f32 / SR as f32;
                let freqs: [f32; 3] = if i < n {
                    [261.63, 329.63, 392.0]
                } else {
                    [220.0, 261.63, 329.63]
                };
                freqs
                    .iter()
                    .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                    .sum::<f32>()
                    * 0.2
            })
            .collect();

        let config = RmeConfig {
            window_length: 1.0,
            hop_length: 1.0,
            chroma: ChromaConfig {
                fmin: 130.812_78,
                n_octaves: 4,
                bins_per_octave: 12,
                ..ChromaConfig::for_type(ChromaType::Cens)
            },
            ..RmeConfig::default()
        };

        let series = rme_across_time(&samples, SR, &config).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.chromagram.chroma_type, ChromaType::Cens);

        let tdm = series.tondeltamax();
        assert!(tdm[0] > tdm[3]);

        let distances = series.distances();
        assert_eq!(distances[0], None);
        let (d1, d2) = (distances[1].unwrap(), distances[2].unwrap());
        assert!(d2 > d1, "change point distance {} should exceed {}", d2, d1);
    }
}
