//! Combining and levelling sample sequences.

/// Blend two sample sequences over their zero-padded union.
///
/// Where both samples are non-zero the result is their mean. Where only one is
/// non-zero it passes through unchanged, so sparse overlays are not attenuated
/// in regions the other signal leaves silent.
pub fn mix_down(first: &[f64], second: &[f64]) -> Vec<f64> {
    let len = first.len().max(second.len());
    (0..len)
        .map(|i| {
            let a = first.get(i).copied().unwrap_or(0.0);
            let b = second.get(i).copied().unwrap_or(0.0);
            match (a != 0.0, b != 0.0) {
                (true, true) => (a + b) / 2.0,
                (false, _) => b,
                (true, false) => a,
            }
        })
        .collect()
}

/// Scale samples so the peak absolute value is 1. All-zero input is returned
/// unchanged.
pub fn normalize(samples: &[f64]) -> Vec<f64> {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
    if peak == 0.0 {
        return samples.to_vec();
    }
    samples.iter().map(|s| s / peak).collect()
}
