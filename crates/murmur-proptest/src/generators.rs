//! Test signal generators and proptest strategies.

use std::f32::consts::PI;

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::SizeRange;

/// Sum of a sine tone and deterministic pseudo-random noise.
///
/// The noise is a 31-bit linear congruential sequence, so the output is
/// identical on every run and platform.
pub fn noisy_tone(
    len: usize,
    frequency: f32,
    sample_rate: f32,
    noise_level: f32,
    seed: u32,
) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|i| {
            state = state.wrapping_mul(69069).wrapping_add(1) & 0x7FFF_FFFF;
            let noise = (state as f32 / 0x7FFF_FFFF as f32) * 2.0 - 1.0;
            let t = i as f32 / sample_rate;
            0.5 * (2.0 * PI * frequency * t).sin() + noise_level * noise
        })
        .collect()
}

/// Samples in the normalized Q15 range `[-1, 1)`.
pub fn samples(len: impl Into<SizeRange>) -> impl Strategy<Value = Vec<f32>> {
    vec(-1.0f32..1.0, len)
}

/// Non-negative power spectra of `num_bins` bins, `frames` of them.
pub fn power_spectra(
    num_bins: usize,
    frames: impl Into<SizeRange>,
) -> impl Strategy<Value = Vec<Vec<f64>>> {
    vec(vec(0.0f64..1e4, num_bins), frames)
}
