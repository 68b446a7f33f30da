//! Analysis window generators.

use std::f64::consts::PI;

/// Periodic Hann window of length `n`: `w[i] = 0.5 - 0.5 cos(2 pi i / n)`.
///
/// `w[i] + w[i + n/2] == 1` for even `n`, so half-frame overlap-add
/// reconstructs the input without gain ripple.
pub fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos()) as f32)
        .collect()
}

/// Unity window of length `n`.
pub fn rectangular(n: usize) -> Vec<f32> {
    vec![1.0; n]
}
