//! Decision-directed Wiener filter.
//!
//! Per bin `k` and frame `n`:
//!
//! ```text
//! snr[k]  = a_snr * snr_prev[k] + (1 - a_snr) * psd[k] / noise[k]
//! xi[k]   = a_dd  * xi_prev[k]  + (1 - a_dd)  * max(snr[k] - 1, eps)
//! gain[k] = xi[k] / (1 + xi[k])            (0 if xi[k] is not finite)
//! out[k]  = gain[k] * in[k]
//! ```
//!
//! The gain is real, so only magnitudes change; phase is preserved.

use murmur_fft::Complex64;

use crate::config::{SNR_FLOOR, WienerFilterConfig, XI_FLOOR};

/// Per-bin spectral gain with decision-directed a priori SNR tracking.
#[derive(Debug, Clone)]
pub struct WienerFilter {
    snr_smoothing: f64,
    dd_smoothing: f64,
    prev_xi: Vec<f64>,
    prev_snr: Vec<f64>,
    gain: Vec<f64>,
    degenerate_bins: usize,
}

impl WienerFilter {
    /// Creates a filter for frames of `frame_size` samples (`N / 2 + 1` bins).
    ///
    /// # Panics
    ///
    /// Panics if `frame_size` is zero or a smoothing factor lies outside
    /// `[0, 1)`.
    pub fn new(frame_size: usize, config: &WienerFilterConfig) -> Self {
        assert!(frame_size > 0, "frame size must be non-zero");
        for (name, value) in [
            ("snr smoothing", config.snr_smoothing),
            ("decision-directed smoothing", config.decision_directed_smoothing),
        ] {
            assert!(
                (0.0..1.0).contains(&value),
                "{name} {value} outside [0, 1)"
            );
        }

        let num_bins = frame_size / 2 + 1;
        Self {
            snr_smoothing: config.snr_smoothing,
            dd_smoothing: config.decision_directed_smoothing,
            prev_xi: vec![0.0; num_bins],
            prev_snr: vec![SNR_FLOOR; num_bins],
            gain: vec![0.0; num_bins],
            degenerate_bins: 0,
        }
    }

    /// Number of bins the filter operates on.
    pub fn num_bins(&self) -> usize {
        self.gain.len()
    }

    /// Computes this frame's gains and writes the filtered spectrum to
    /// `filtered`.
    ///
    /// # Panics
    ///
    /// Panics unless `spectrum`, `psd`, `noise_psd` and `filtered` all have
    /// [`num_bins`](Self::num_bins) elements.
    pub fn apply(
        &mut self,
        spectrum: &[Complex64],
        psd: &[f64],
        noise_psd: &[f64],
        filtered: &mut [Complex64],
    ) {
        let num_bins = self.num_bins();
        assert_eq!(spectrum.len(), num_bins, "spectrum length");
        assert_eq!(psd.len(), num_bins, "psd length");
        assert_eq!(noise_psd.len(), num_bins, "noise psd length");
        assert_eq!(filtered.len(), num_bins, "filtered spectrum length");

        let a_snr = self.snr_smoothing;
        let a_dd = self.dd_smoothing;
        self.degenerate_bins = 0;

        for k in 0..num_bins {
            let snr = a_snr * self.prev_snr[k] + (1.0 - a_snr) * (psd[k] / noise_psd[k]);

            // Written as a comparison so a NaN excess reaches xi instead of
            // being swallowed by `f64::max`.
            let excess = snr - 1.0;
            let excess = if excess < XI_FLOOR { XI_FLOOR } else { excess };
            let xi = a_dd * self.prev_xi[k] + (1.0 - a_dd) * excess;

            let gain = if xi.is_finite() {
                xi / (1.0 + xi)
            } else {
                self.degenerate_bins += 1;
                0.0
            };

            filtered[k] = spectrum[k] * gain;
            self.gain[k] = gain;
            self.prev_xi[k] = xi;
            self.prev_snr[k] = snr;
        }

        if self.degenerate_bins > 0 {
            tracing::warn!(
                bins = self.degenerate_bins,
                "non-finite a priori SNR, forcing zero gain"
            );
        }
    }

    /// Gains computed by the last [`apply`](Self::apply).
    pub fn gain(&self) -> &[f64] {
        &self.gain
    }

    /// Number of bins whose gain was forced to zero by the last
    /// [`apply`](Self::apply).
    pub fn degenerate_bins(&self) -> usize {
        self.degenerate_bins
    }

    /// Last a priori SNR per bin.
    pub fn a_priori_snr(&self) -> &[f64] {
        &self.prev_xi
    }

    /// Last smoothed a posteriori SNR per bin.
    pub fn a_posteriori_snr(&self) -> &[f64] {
        &self.prev_snr
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use test_strategy::proptest;

    use super::*;

    fn filter(frame_size: usize) -> WienerFilter {
        WienerFilter::new(frame_size, &WienerFilterConfig::default())
    }

    fn unit_spectrum(n: usize) -> Vec<Complex64> {
        vec![Complex64::new(1.0, -2.0); n]
    }

    #[test]
    fn initial_state() {
        let wf = filter(8);
        assert_eq!(wf.num_bins(), 5);
        assert_eq!(wf.a_priori_snr(), &[0.0; 5]);
        assert_eq!(wf.a_posteriori_snr(), &[SNR_FLOOR; 5]);
    }

    #[test]
    fn first_frame_matches_hand_computation() {
        let mut wf = filter(2);
        let spectrum = [Complex64::new(3.0, 4.0), Complex64::new(-1.0, 0.5)];
        let psd = [25.0, 1.25];
        let noise = [1.0, 2.5];
        let mut out = [Complex64::new(0.0, 0.0); 2];
        wf.apply(&spectrum, &psd, &noise, &mut out);

        // Bin 0: snr = 0.15e-10 + 0.85 * 25, xi = 0.65 * (snr - 1).
        let snr0 = 0.15 * SNR_FLOOR + 0.85 * 25.0;
        let xi0 = 0.65 * (snr0 - 1.0);
        let g0 = xi0 / (1.0 + xi0);
        assert!((wf.gain()[0] - g0).abs() < 1e-12);
        assert!((out[0] - spectrum[0] * g0).norm() < 1e-12);

        // Bin 1: snr < 1, so xi is floored.
        let xi1 = 0.65 * XI_FLOOR;
        assert!((wf.a_priori_snr()[1] - xi1).abs() < 1e-20);
        assert!(wf.gain()[1] < 1e-9);
        assert_eq!(wf.degenerate_bins(), 0);
    }

    #[test]
    fn gain_preserves_phase() {
        let mut wf = filter(6);
        let spectrum: Vec<Complex64> = (0..4)
            .map(|k| Complex64::from_polar(1.0 + k as f64, 0.3 * k as f64))
            .collect();
        let psd: Vec<f64> = spectrum.iter().map(|c| c.norm_sqr()).collect();
        let noise = [0.1; 4];
        let mut out = vec![Complex64::new(0.0, 0.0); 4];
        wf.apply(&spectrum, &psd, &noise, &mut out);

        for (x, y) in spectrum.iter().zip(&out) {
            assert!((x.arg() - y.arg()).abs() < 1e-12);
            assert!(y.norm() <= x.norm());
        }
    }

    #[test]
    fn state_carries_across_frames() {
        let mut wf = filter(2);
        let spectrum = unit_spectrum(2);
        let psd = [10.0, 10.0];
        let noise = [1.0, 1.0];
        let mut out = unit_spectrum(2);

        wf.apply(&spectrum, &psd, &noise, &mut out);
        let first = wf.gain()[0];
        wf.apply(&spectrum, &psd, &noise, &mut out);
        let second = wf.gain()[0];
        // The a priori SNR keeps rising toward its fixed point.
        assert!(second > first);
        for _ in 0..100 {
            wf.apply(&spectrum, &psd, &noise, &mut out);
        }
        // Fixed point: snr = 10, xi = 9, gain = 0.9.
        assert!((wf.a_posteriori_snr()[0] - 10.0).abs() < 1e-9);
        assert!((wf.a_priori_snr()[0] - 9.0).abs() < 1e-9);
        assert!((wf.gain()[0] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn overflowing_ratio_gives_zero_gain() {
        let mut wf = filter(4);
        let spectrum = unit_spectrum(3);
        let psd = [f64::MAX, 1.0, f64::MAX];
        let noise = [f64::MIN_POSITIVE, 1.0, 1e-300];
        let mut out = unit_spectrum(3);
        wf.apply(&spectrum, &psd, &noise, &mut out);

        assert_eq!(wf.gain()[0], 0.0);
        assert_eq!(wf.gain()[2], 0.0);
        assert_eq!(out[0], Complex64::new(0.0, 0.0));
        assert!(wf.gain()[1].is_finite());
        assert_eq!(wf.degenerate_bins(), 2);
        assert!(wf.gain().iter().all(|g| !g.is_nan() && *g >= 0.0));
    }

    #[test]
    fn zero_noise_with_zero_power_gives_zero_gain() {
        let mut wf = filter(2);
        let spectrum = unit_spectrum(2);
        let mut out = unit_spectrum(2);
        wf.apply(&spectrum, &[0.0, 0.0], &[0.0, 1.0], &mut out);
        // 0 / 0 is NaN and must not leak into the output.
        assert_eq!(wf.gain()[0], 0.0);
        assert_eq!(out[0], Complex64::new(0.0, 0.0));
        assert_eq!(wf.degenerate_bins(), 1);
    }

    #[test]
    #[should_panic(expected = "noise psd length")]
    fn rejects_mismatched_lengths() {
        let mut wf = filter(4);
        let mut out = unit_spectrum(3);
        wf.apply(&unit_spectrum(3), &[1.0; 3], &[1.0; 2], &mut out);
    }

    #[proptest]
    fn gain_stays_in_unit_interval(
        #[strategy(vec(vec(0.0f64..1e6, 5), 1..20))] frames: Vec<Vec<f64>>,
        #[strategy(vec(1e-6f64..1e3, 5))] noise: Vec<f64>,
    ) {
        let mut wf = filter(8);
        let spectrum = unit_spectrum(5);
        let mut out = unit_spectrum(5);
        for psd in &frames {
            wf.apply(&spectrum, psd, &noise, &mut out);
            for (&g, &xi) in wf.gain().iter().zip(wf.a_priori_snr()) {
                proptest::prop_assert!(xi.is_finite() && xi >= 0.0);
                proptest::prop_assert!((0.0..1.0).contains(&g), "gain {g}");
            }
        }
    }
}
