//! Shared framing and windowing for spectral chroma

use rustfft::num_complex::Complex;

/// Number of frames covering `n_samples` at `hop_size` (one per started hop block)
pub fn frame_count(n_samples: usize, hop_size: usize) -> usize {
    if hop_size == 0 {
        return 0;
    }
    n_samples.div_ceil(hop_size)
}

/// Sample index at the centre of frame `frame`'s hop block
pub fn frame_center(frame: usize, hop_size: usize) -> usize {
    frame * hop_size + hop_size / 2
}

/// Periodic Hann window (suitable for spectral analysis)
pub fn hann_window(len: usize) -> Vec<f32> {
    if len <= 1 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / len as f32;
            0.5 * (1.0 - t.cos())
        })
        .collect()
}

/// Symmetric Hann window with zero end points removed
///
/// Every tap is strictly positive, which is what a smoothing kernel needs.
pub fn hann_window_open(len: usize) -> Vec<f32> {
    let full = len + 2;
    (1..=len)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / (full - 1) as f32;
            0.5 * (1.0 - t.cos())
        })
        .collect()
}

/// Copy the segment of `samples` centred at `center` into `buf`
///
/// The segment spans `buf.len()` samples starting at `center - buf.len() / 2`;
/// positions outside the signal are zero. If `window` is given it must have
/// `buf.len()` taps.
pub fn fill_frame(
    samples: &[f32],
    center: usize,
    window: Option<&[f32]>,
    buf: &mut [Complex<f32>],
) {
    let len = buf.len();
    let start = center as isize - (len / 2) as isize;
    for (j, slot) in buf.iter_mut().enumerate() {
        let idx = start + j as isize;
        let x = if idx >= 0 && (idx as usize) < samples.len() {
            samples[idx as usize]
        } else {
            0.0
        };
        let w = window.map_or(1.0, |w| w[j]);
        *slot = Complex::new(x * w, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(0, 512), 0);
        assert_eq!(frame_count(1, 512), 1);
        assert_eq!(frame_count(512, 512), 1);
        assert_eq!(frame_count(513, 512), 2);
        // 30 s at 22050 Hz
        assert_eq!(frame_count(661_500, 512), 1292);
    }

    #[test]
    fn test_hann_window() {
        let w = hann_window(8);
        assert_eq!(w.len(), 8);
        assert!(w[0].abs() < 1e-6);
        assert!((w[4] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hann_window_open_positive() {
        let w = hann_window_open(41);
        assert_eq!(w.len(), 41);
        assert!(w.iter().all(|&x| x > 0.0));
        assert!((w[20] - 1.0).abs() < 1e-6);
        assert!((w[0] - w[40]).abs() < 1e-6);
    }

    #[test]
    fn test_fill_frame_zero_pads() {
        let samples = vec![1.0f32; 10];
        let mut buf = vec![Complex::new(0.0f32, 0.0); 8];
        fill_frame(&samples, 0, None, &mut buf);
        // First half lies before the signal
        assert!(buf[..4].iter().all(|c| c.re == 0.0));
        assert!(buf[4..].iter().all(|c| c.re == 1.0));
    }
}
