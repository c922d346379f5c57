//! STFT chroma
//!
//! Projects the Hann-windowed power spectrum of each frame onto 12 pitch
//! classes through a Gaussian chroma filterbank, then scales each frame so its
//! strongest pitch class is 1.
//!
//! # Algorithm
//!
//! 1. For each FFT bin, compute its fractional pitch (in semitones above C0)
//! 2. Each pitch class gets a Gaussian bump around every octave of that class,
//!    as wide as the bin spacing (at least one semitone)
//! 3. Columns are L2-normalized, then weighted by a Gaussian over octaves
//!    centred near 880 Hz so very low and very high bins contribute less
//! 4. `chroma = filterbank @ |STFT|^2`

use super::normalization::normalize_max;
use super::spectrum::{fill_frame, frame_center, frame_count, hann_window};
use super::N_PITCH_CLASSES;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Octave (relative to A0) at the centre of the octave weighting
const CENTER_OCTAVE: f32 = 5.0;

/// Width of the octave weighting, in octaves
const OCTAVE_WIDTH: f32 = 2.0;

/// Build the chroma filterbank for an FFT size
///
/// Returns `N_PITCH_CLASSES` rows of `frame_size / 2 + 1` weights, row 0 = C.
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT size
/// * `tuning` - Deviation from A440 in fractions of a semitone
pub fn chroma_filterbank(sample_rate: u32, frame_size: usize, tuning: f32) -> Vec<Vec<f32>> {
    let n_freq = frame_size / 2 + 1;
    let n_chroma = N_PITCH_CLASSES as f32;
    let mut weights = vec![vec![0.0f32; n_freq]; N_PITCH_CLASSES];

    if frame_size < 2 || sample_rate == 0 {
        return weights;
    }

    let a440 = 440.0 * 2.0f32.powf(tuning / n_chroma);
    let a0 = a440 / 16.0;
    // C0 sits 9 semitones below A0
    let c0 = a0 * 2.0f32.powf(-9.0 / n_chroma);

    // Fractional pitch of every bin above DC, in semitones above C0
    let mut pitch: Vec<f32> = (1..n_freq)
        .map(|i| {
            let f = i as f32 * sample_rate as f32 / frame_size as f32;
            n_chroma * (f / c0).log2()
        })
        .collect();
    // DC gets a made-up pitch 1.5 octaves below the first bin
    let dc = pitch.first().map_or(0.0, |&p| p - 1.5 * n_chroma);
    pitch.insert(0, dc);

    let widths: Vec<f32> = (0..n_freq)
        .map(|i| {
            if i + 1 < n_freq {
                (pitch[i + 1] - pitch[i]).max(1.0)
            } else {
                1.0
            }
        })
        .collect();

    let half = (n_chroma / 2.0).round();
    for (class, row) in weights.iter_mut().enumerate() {
        for (fbin, w) in row.iter_mut().enumerate() {
            // Distance to the nearest octave of this pitch class, in (-6, 6]
            let d = pitch[fbin] - class as f32;
            let d = (d + half + 10.0 * n_chroma).rem_euclid(n_chroma) - half;
            *w = (-0.5 * (2.0 * d / widths[fbin]).powi(2)).exp();
        }
    }

    for fbin in 0..n_freq {
        let norm = weights
            .iter()
            .map(|row| (row[fbin] as f64).powi(2))
            .sum::<f64>()
            .sqrt()
            .max(1e-10);
        // Octave relative to A0 = pitch / 12 - 0.75
        let octave = pitch[fbin] / n_chroma - 9.0 / n_chroma;
        let octave_weight = (-0.5 * ((octave - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
        for row in weights.iter_mut() {
            row[fbin] = (row[fbin] as f64 / norm) as f32 * octave_weight;
        }
    }

    weights
}

/// Compute STFT chroma
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT size (default: 2048)
/// * `hop_size` - Hop size (default: 512)
/// * `tuning` - Deviation from A440 in fractions of a semitone
///
/// # Returns
///
/// One 12-element chroma vector per frame (`ceil(len / hop_size)` frames),
/// scaled to max 1. Silent frames are all-zero.
///
/// # Errors
///
/// Returns `InvalidInput` for a zero sample rate, a frame size below 2 or a zero hop.
pub fn chroma_stft(
    samples: &[f32],
    sample_rate: u32,
    frame_size: usize,
    hop_size: usize,
    tuning: f32,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }
    if frame_size < 2 {
        return Err(AnalysisError::InvalidInput(format!(
            "Frame size must be >= 2, got {}",
            frame_size
        )));
    }
    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    let n_frames = frame_count(samples.len(), hop_size);
    log::debug!(
        "Computing STFT chroma: {} samples at {} Hz, frame_size={}, hop_size={}, {} frames",
        samples.len(),
        sample_rate,
        frame_size,
        hop_size,
        n_frames
    );

    let filterbank = chroma_filterbank(sample_rate, frame_size, tuning);
    let window = hann_window(frame_size);
    let n_freq = frame_size / 2 + 1;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buf = vec![Complex::new(0.0f32, 0.0); frame_size];
    let mut power = vec![0.0f32; n_freq];

    let mut chroma = Vec::with_capacity(n_frames);
    for t in 0..n_frames {
        fill_frame(samples, frame_center(t, hop_size), Some(&window), &mut buf);
        fft.process(&mut buf);

        for (p, c) in power.iter_mut().zip(buf.iter()) {
            *p = c.re * c.re + c.im * c.im;
        }

        let mut frame: Vec<f32> = filterbank
            .iter()
            .map(|row| {
                row.iter()
                    .zip(power.iter())
                    .map(|(&w, &p)| w as f64 * p as f64)
                    .sum::<f64>() as f32
            })
            .collect();
        normalize_max(&mut frame);
        chroma.push(frame);
    }

    Ok(chroma)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_filterbank_shape() {
        let fb = chroma_filterbank(22050, 2048, 0.0);
        assert_eq!(fb.len(), 12);
        assert!(fb.iter().all(|row| row.len() == 1025));
        assert!(fb.iter().flatten().all(|w| w.is_finite() && *w >= 0.0));
    }

    #[test]
    fn test_chroma_stft_a440() {
        let samples = tone(440.0, 22050, 1.0);
        let chroma = chroma_stft(&samples, 22050, 2048, 512, 0.0).unwrap();
        assert_eq!(chroma.len(), frame_count(samples.len(), 512));

        // Middle frames should peak on A (index 9)
        let frame = &chroma[chroma.len() / 2];
        let peak = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 9);
        assert!((frame[9] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_chroma_stft_c_major_triad() {
        let sr = 22050;
        let c = tone(261.63, sr, 1.0);
        let e = tone(329.63, sr, 1.0);
        let g = tone(392.00, sr, 1.0);
        let samples: Vec<f32> = c
            .iter()
            .zip(e.iter())
            .zip(g.iter())
            .map(|((a, b), c)| (a + b + c) / 3.0)
            .collect();
        let chroma = chroma_stft(&samples, sr, 2048, 512, 0.0).unwrap();
        let frame = &chroma[chroma.len() / 2];
        for &class in &[0usize, 4, 7] {
            for &other in &[1usize, 3, 6, 8, 10] {
                assert!(frame[class] > frame[other]);
            }
        }
    }

    #[test]
    fn test_chroma_stft_silence() {
        let samples = vec![0.0f32; 4096];
        let chroma = chroma_stft(&samples, 22050, 2048, 512, 0.0).unwrap();
        assert_eq!(chroma.len(), 8);
        assert!(chroma.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_chroma_stft_invalid_params() {
        let samples = vec![0.0f32; 1024];
        assert!(chroma_stft(&samples, 0, 2048, 512, 0.0).is_err());
        assert!(chroma_stft(&samples, 22050, 1, 512, 0.0).is_err());
        assert!(chroma_stft(&samples, 22050, 2048, 0, 0.0).is_err());
    }

    #[test]
    fn test_chroma_stft_empty() {
        let chroma = chroma_stft(&[], 22050, 2048, 512, 0.0).unwrap();
        assert!(chroma.is_empty());
    }
}
