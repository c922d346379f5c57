//! Constant-Q chroma
//!
//! Computes constant-Q magnitudes with sparse spectral kernels and folds the
//! bins onto 12 pitch classes.
//!
//! # Reference
//!
//! Brown, J. C., & Puckette, M. S. (1992). An efficient algorithm for the calculation of a
//! constant Q transform. *Journal of the Acoustical Society of America*, 92(5), 2698-2701.
//!
//! # Algorithm
//!
//! 1. Bin `k` has centre frequency `fmin * 2^(k / bins_per_octave)` and a Hann-windowed
//!    complex exponential of length `ceil(Q * sr / f_k)` as its temporal kernel
//! 2. Kernels are centred in one FFT buffer, transformed once, and thresholded to
//!    keep only significant spectral coefficients
//! 3. Per frame, one FFT of the frame segment is multiplied against every sparse
//!    kernel (Parseval), giving the constant-Q coefficient of each bin
//! 4. Magnitudes of all bins of the same pitch class are summed

use super::normalization::normalize_max;
use super::spectrum::{fill_frame, frame_center, frame_count};
use super::N_PITCH_CLASSES;
use crate::error::AnalysisError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Spectral kernel coefficients below this share of a bin's peak are dropped
const SPARSITY_THRESHOLD: f32 = 0.0054;

/// Upper bound on the number of constant-Q bins
const MAX_BINS: usize = 4096;

/// Upper bound on a temporal kernel's length in samples
const MAX_KERNEL_LEN: usize = 1 << 20;

/// One constant-Q bin: its pitch class and sparse spectral kernel
#[derive(Debug, Clone)]
struct SparseBin {
    pitch_class: usize,
    /// (FFT bin, conjugated kernel coefficient / fft_len)
    entries: Vec<(usize, Complex<f32>)>,
}

/// Precomputed constant-Q kernel for one parameter set
#[derive(Debug, Clone)]
pub struct CqtKernel {
    fft_len: usize,
    bins: Vec<SparseBin>,
}

impl CqtKernel {
    /// Build the kernel
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `fmin` - Centre frequency of the lowest bin in Hz (should be a semitone)
    /// * `n_octaves` - Number of octaves
    /// * `bins_per_octave` - Bins per octave, a multiple of 12
    /// * `tuning` - Deviation from A440 in fractions of a semitone
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for non-positive parameters, a `bins_per_octave`
    /// that is not a multiple of 12, or when every bin lies above Nyquist.
    pub fn new(
        sample_rate: u32,
        fmin: f32,
        n_octaves: usize,
        bins_per_octave: usize,
        tuning: f32,
    ) -> Result<Self, AnalysisError> {
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if !(fmin > 0.0 && fmin.is_finite()) {
            return Err(AnalysisError::InvalidInput(format!(
                "fmin must be a positive frequency, got {}",
                fmin
            )));
        }
        if n_octaves == 0 {
            return Err(AnalysisError::InvalidInput(
                "n_octaves must be > 0".to_string(),
            ));
        }
        if bins_per_octave == 0 || bins_per_octave % N_PITCH_CLASSES != 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "bins_per_octave must be a positive multiple of 12, got {}",
                bins_per_octave
            )));
        }

        if !tuning.is_finite() {
            return Err(AnalysisError::InvalidInput(format!(
                "Tuning must be finite, got {}",
                tuning
            )));
        }
        let n_bins = n_octaves
            .checked_mul(bins_per_octave)
            .filter(|&n| n <= MAX_BINS)
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "{} octaves x {} bins exceeds the limit of {} CQT bins",
                    n_octaves, bins_per_octave, MAX_BINS
                ))
            })?;

        let sr = sample_rate as f64;
        let nyquist = sr / 2.0;
        let bpo = bins_per_octave as f64;
        let q = 1.0 / (2.0f64.powf(1.0 / bpo) - 1.0);
        let tuned_fmin = fmin as f64 * 2.0f64.powf(tuning as f64 / N_PITCH_CLASSES as f64);

        // Pitch class of bin 0 from the nominal (untuned) fmin
        let midi_fmin = (69.0 + 12.0 * (fmin as f64 / 440.0).log2()).round() as i64;

        let mut specs = Vec::with_capacity(n_bins);
        let mut skipped = 0usize;
        for k in 0..n_bins {
            let freq = tuned_fmin * 2.0f64.powf(k as f64 / bpo);
            if freq >= nyquist {
                skipped += 1;
                continue;
            }
            let len = (q * sr / freq).ceil();
            if len.is_nan() || len > MAX_KERNEL_LEN as f64 {
                return Err(AnalysisError::InvalidInput(format!(
                    "CQT kernel for {:.3e} Hz would need {:.3e} samples (limit {})",
                    freq, len, MAX_KERNEL_LEN
                )));
            }
            let len = len as usize;
            // Round half up: with 24 bins/octave the quarter-tone bin joins the class above
            let semitone = (N_PITCH_CLASSES * k + bins_per_octave / 2) / bins_per_octave;
            let pitch_class =
                (midi_fmin + semitone as i64).rem_euclid(N_PITCH_CLASSES as i64) as usize;
            specs.push((freq, len.max(1), pitch_class));
        }

        if skipped > 0 {
            log::warn!(
                "Skipping {} of {} CQT bins at or above Nyquist ({:.1} Hz)",
                skipped,
                n_bins,
                nyquist
            );
        }
        if specs.is_empty() {
            return Err(AnalysisError::InvalidInput(format!(
                "All CQT bins lie above Nyquist (fmin={:.2} Hz, sample rate {} Hz)",
                fmin, sample_rate
            )));
        }

        let max_len = specs.iter().map(|&(_, len, _)| len).max().unwrap_or(1);
        let fft_len = max_len.next_power_of_two();

        log::debug!(
            "Building CQT kernel: {} bins, Q={:.2}, fft_len={}",
            specs.len(),
            q,
            fft_len
        );

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_len);
        let mut buf = vec![Complex::new(0.0f32, 0.0); fft_len];

        let mut bins = Vec::with_capacity(specs.len());
        for (freq, len, pitch_class) in specs {
            buf.iter_mut().for_each(|c| *c = Complex::new(0.0, 0.0));
            let start = fft_len / 2 - len / 2;
            for n in 0..len {
                let w = if len > 1 {
                    0.5 * (1.0 - (2.0 * std::f64::consts::PI * n as f64 / (len - 1) as f64).cos())
                } else {
                    1.0
                };
                let phase = 2.0 * std::f64::consts::PI * freq * (n as f64 - (len / 2) as f64) / sr;
                let scale = w / len as f64;
                buf[start + n] =
                    Complex::new((scale * phase.cos()) as f32, (scale * phase.sin()) as f32);
            }
            fft.process(&mut buf);

            let peak = buf.iter().map(|c| c.norm()).fold(0.0f32, f32::max);
            let floor = peak * SPARSITY_THRESHOLD;
            let norm = fft_len as f32;
            let entries = buf
                .iter()
                .enumerate()
                .filter(|(_, c)| c.norm() > floor)
                .map(|(j, c)| (j, c.conj() / norm))
                .collect();

            bins.push(SparseBin {
                pitch_class,
                entries,
            });
        }

        Ok(Self { fft_len, bins })
    }

    /// FFT length used per frame
    pub fn fft_len(&self) -> usize {
        self.fft_len
    }

    /// Number of constant-Q bins below Nyquist
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Un-normalized chroma (summed constant-Q magnitudes) for every frame
    pub fn chroma(&self, samples: &[f32], hop_size: usize) -> Vec<Vec<f32>> {
        let n_frames = frame_count(samples.len(), hop_size);

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(self.fft_len);
        let mut buf = vec![Complex::new(0.0f32, 0.0); self.fft_len];

        let mut chroma = Vec::with_capacity(n_frames);
        for t in 0..n_frames {
            fill_frame(samples, frame_center(t, hop_size), None, &mut buf);
            fft.process(&mut buf);

            let mut frame = vec![0.0f32; N_PITCH_CLASSES];
            for bin in &self.bins {
                let coeff: Complex<f32> = bin
                    .entries
                    .iter()
                    .map(|&(j, k)| buf[j] * k)
                    .sum();
                frame[bin.pitch_class] += coeff.norm();
            }
            chroma.push(frame);
        }
        chroma
    }
}

/// Compute CQT chroma without per-frame normalization
///
/// # Errors
///
/// Returns `InvalidInput` for invalid kernel parameters or a zero hop.
pub fn chroma_cqt_raw(
    samples: &[f32],
    sample_rate: u32,
    hop_size: usize,
    fmin: f32,
    n_octaves: usize,
    bins_per_octave: usize,
    tuning: f32,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    log::debug!(
        "Computing CQT chroma: {} samples at {} Hz, hop_size={}, fmin={:.2} Hz, {} octaves x {} bins",
        samples.len(),
        sample_rate,
        hop_size,
        fmin,
        n_octaves,
        bins_per_octave
    );

    let kernel = CqtKernel::new(sample_rate, fmin, n_octaves, bins_per_octave, tuning)?;
    Ok(kernel.chroma(samples, hop_size))
}

/// Compute CQT chroma, each frame scaled to max 1
pub fn chroma_cqt(
    samples: &[f32],
    sample_rate: u32,
    hop_size: usize,
    fmin: f32,
    n_octaves: usize,
    bins_per_octave: usize,
    tuning: f32,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let mut chroma = chroma_cqt_raw(
        samples,
        sample_rate,
        hop_size,
        fmin,
        n_octaves,
        bins_per_octave,
        tuning,
    )?;
    for frame in chroma.iter_mut() {
        normalize_max(frame);
    }
    Ok(chroma)
}
