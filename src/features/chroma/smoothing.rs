//! Temporal chroma smoothing

use super::spectrum::hann_window_open;

/// Smooth chroma vectors over time with a normalized Hann window
///
/// Each pitch class is convolved independently ("same" length, zeros beyond
/// the edges), so frames near the boundaries lose some energy, as in CENS.
///
/// # Arguments
///
/// * `chroma_vectors` - Vector of chroma vectors (all the same length)
/// * `window_size` - Smoothing window size in frames (0 or 1 = no smoothing)
///
/// # Returns
///
/// Smoothed chroma vectors
pub fn smooth_chroma(chroma_vectors: &[Vec<f32>], window_size: usize) -> Vec<Vec<f32>> {
    log::debug!(
        "Smoothing {} chroma vectors with window size {}",
        chroma_vectors.len(),
        window_size
    );

    if window_size <= 1 || chroma_vectors.is_empty() {
        return chroma_vectors.to_vec();
    }

    let window = hann_window_open(window_size);
    let window_sum: f32 = window.iter().sum();
    let half = (window_size / 2) as isize;
    let n_frames = chroma_vectors.len() as isize;
    let n_bins = chroma_vectors[0].len();

    (0..n_frames)
        .map(|t| {
            let mut out = vec![0.0f32; n_bins];
            for (w_idx, &w) in window.iter().enumerate() {
                let src = t + w_idx as isize - half;
                if src < 0 || src >= n_frames {
                    continue;
                }
                for (o, &v) in out.iter_mut().zip(chroma_vectors[src as usize].iter()) {
                    *o += v * w;
                }
            }
            out.iter_mut().for_each(|o| *o /= window_sum);
            out
        })
        .collect()
}
