//! Chroma normalization strategies

/// Frames whose norm falls below this are left untouched
const EPSILON: f32 = 1e-10;

/// CENS quantization thresholds on L1-normalized energy
const CENS_QUANT_STEPS: [f32; 4] = [0.4, 0.2, 0.1, 0.05];

/// Weight added for each CENS threshold exceeded
const CENS_QUANT_WEIGHT: f32 = 0.25;

/// Scale a chroma vector so its largest magnitude is 1 (L-infinity norm)
pub fn normalize_max(chroma: &mut [f32]) {
    let max = chroma.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    if max > EPSILON {
        chroma.iter_mut().for_each(|v| *v /= max);
    }
}

/// Scale a chroma vector so its magnitudes sum to 1 (L1 norm)
pub fn normalize_l1(chroma: &mut [f32]) {
    let sum: f32 = chroma.iter().map(|v| v.abs()).sum();
    if sum > EPSILON {
        chroma.iter_mut().for_each(|v| *v /= sum);
    }
}

/// Scale a chroma vector to unit Euclidean length (L2 norm)
pub fn normalize_l2(chroma: &mut [f32]) {
    let norm = chroma.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > EPSILON {
        chroma.iter_mut().for_each(|v| *v /= norm);
    }
}

/// Quantize an L1-normalized chroma vector for CENS
///
/// Each value becomes `0.25` times the number of thresholds
/// (0.4, 0.2, 0.1, 0.05) it exceeds, so the result is in {0, 0.25, 0.5, 0.75, 1}.
pub fn cens_quantize(chroma: &mut [f32]) {
    for v in chroma.iter_mut() {
        let steps = CENS_QUANT_STEPS.iter().filter(|&&s| *v > s).count();
        *v = steps as f32 * CENS_QUANT_WEIGHT;
    }
}
