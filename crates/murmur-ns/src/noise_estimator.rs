//! Minimum-statistics noise power estimation.
//!
//! Each bin's power is smoothed by a leaky integrator and the last `D`
//! smoothed values are kept in a history. The noise estimate is the history
//! minimum scaled by a bias compensation factor: as long as noise alone
//! dominates a bin at some point within any `D` frames, the minimum tracks
//! the noise floor even while speech is present.

use crate::config::{HISTORY_INIT, NOISE_FLOOR, NoiseEstimatorConfig};

/// Per-bin noise PSD tracker.
///
/// The history is one contiguous `num_bins * depth` arena, bin-major, with a
/// single write slot shared by every bin: all bins are written and searched
/// at the same temporal position.
#[derive(Debug, Clone)]
pub struct NoiseEstimator {
    num_bins: usize,
    depth: usize,
    smoothing: f64,
    smoothed: Vec<f64>,
    history: Vec<f64>,
    noise_estimate: Vec<f64>,
    bias_compensation: Vec<f64>,
    write_index: usize,
}

impl NoiseEstimator {
    /// Creates an estimator for `num_bins` frequency bins.
    ///
    /// # Panics
    ///
    /// Panics if `num_bins` or the history depth is zero, the smoothing factor
    /// is outside `[0, 1)`, or the bias compensation is not strictly positive.
    pub fn new(num_bins: usize, config: &NoiseEstimatorConfig) -> Self {
        assert!(num_bins > 0, "noise estimator needs at least one bin");
        assert!(config.history_depth > 0, "history depth must be non-zero");
        assert!(
            (0.0..1.0).contains(&config.smoothing_factor),
            "smoothing factor {} outside [0, 1)",
            config.smoothing_factor
        );
        assert!(
            config.bias_compensation.is_finite() && config.bias_compensation > 0.0,
            "bias compensation {} must be positive",
            config.bias_compensation
        );

        let depth = config.history_depth;
        Self {
            num_bins,
            depth,
            smoothing: config.smoothing_factor,
            smoothed: vec![0.0; num_bins],
            history: vec![HISTORY_INIT; num_bins * depth],
            noise_estimate: vec![NOISE_FLOOR; num_bins],
            bias_compensation: vec![config.bias_compensation; num_bins],
            write_index: 0,
        }
    }

    /// Number of bins `B`.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// History depth `D`.
    pub fn history_depth(&self) -> usize {
        self.depth
    }

    /// Folds the power spectrum of the next frame into the estimate.
    ///
    /// # Panics
    ///
    /// Panics if `power_spectrum.len()` differs from the configured bin count.
    pub fn update(&mut self, power_spectrum: &[f64]) {
        assert_eq!(
            power_spectrum.len(),
            self.num_bins,
            "power spectrum length does not match estimator bin count"
        );
        debug_assert!(self.write_index < self.depth);

        let alpha = self.smoothing;
        let slot = self.write_index;
        for (((smoothed, &p), (history, noise)), &bias) in self
            .smoothed
            .iter_mut()
            .zip(power_spectrum)
            .zip(
                self.history
                    .chunks_exact_mut(self.depth)
                    .zip(self.noise_estimate.iter_mut()),
            )
            .zip(&self.bias_compensation)
        {
            *smoothed = alpha * *smoothed + (1.0 - alpha) * p;
            history[slot] = *smoothed;
            let min = history.iter().copied().fold(f64::INFINITY, f64::min);
            // Digital silence drives the minimum to zero; keep the estimate
            // usable as a divisor.
            let estimate = bias * min;
            *noise = if estimate > 0.0 { estimate } else { NOISE_FLOOR };
        }

        self.write_index = (self.write_index + 1) % self.depth;
    }

    /// Current per-bin noise PSD, valid until the next [`update`](Self::update).
    pub fn noise_estimate(&self) -> &[f64] {
        &self.noise_estimate
    }

    /// Current leaky-integrated power spectrum.
    pub fn smoothed_spectrum(&self) -> &[f64] {
        &self.smoothed
    }
}
