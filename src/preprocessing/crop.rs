//! Time-based cropping and slicing of sample buffers

use crate::error::AnalysisError;

/// Convert seconds to a sample count, rounding to the nearest sample
pub fn seconds_to_samples(seconds: f32, sample_rate: u32) -> usize {
    (seconds as f64 * sample_rate as f64).round().max(0.0) as usize
}

fn check_seconds(name: &str, value: f32) -> Result<(), AnalysisError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Remove `crop_start` seconds from the front and `crop_end` seconds from the back
///
/// # Errors
///
/// - `InvalidInput` for a zero sample rate or negative/non-finite crop values
/// - `InsufficientAudio` if nothing remains after cropping
pub fn crop_seconds(
    samples: &[f32],
    sample_rate: u32,
    crop_start: f32,
    crop_end: f32,
) -> Result<&[f32], AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }
    check_seconds("crop_start", crop_start)?;
    check_seconds("crop_end", crop_end)?;

    let front = seconds_to_samples(crop_start, sample_rate);
    let back = seconds_to_samples(crop_end, sample_rate);

    if front.saturating_add(back) >= samples.len() {
        return Err(AnalysisError::InsufficientAudio(format!(
            "Cropping {:.2}s + {:.2}s leaves no audio from {:.2}s",
            crop_start,
            crop_end,
            samples.len() as f32 / sample_rate as f32
        )));
    }

    log::debug!(
        "Cropping {} samples from the front and {} from the back of {}",
        front,
        back,
        samples.len()
    );

    Ok(&samples[front..samples.len() - back])
}

/// Slice `[start, end)` seconds out of a sample buffer
///
/// `None` bounds mean the start/end of the buffer. An `end` beyond the buffer
/// is clamped.
///
/// # Errors
///
/// - `InvalidInput` for a zero sample rate, negative bounds, or `start >= end`
/// - `InsufficientAudio` if the range holds no samples
pub fn slice_seconds(
    samples: &[f32],
    sample_rate: u32,
    start: Option<f32>,
    end: Option<f32>,
) -> Result<&[f32], AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }
    if let Some(s) = start {
        check_seconds("start", s)?;
    }
    if let Some(e) = end {
        check_seconds("end", e)?;
    }
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(AnalysisError::InvalidInput(format!(
                "Fragment start ({:.2}s) must be before end ({:.2}s)",
                s, e
            )));
        }
    }

    let from = start.map_or(0, |s| seconds_to_samples(s, sample_rate));
    let to = end
        .map_or(samples.len(), |e| seconds_to_samples(e, sample_rate))
        .min(samples.len());

    if from >= to {
        return Err(AnalysisError::InsufficientAudio(format!(
            "Fragment {:?}..{:?}s holds no samples ({:.2}s of audio)",
            start,
            end,
            samples.len() as f32 / sample_rate as f32
        )));
    }

    Ok(&samples[from..to])
}
