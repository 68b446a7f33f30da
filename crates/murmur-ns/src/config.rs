//! Configuration and constants for the noise suppression stages.

/// Leaky-integrator coefficient applied to the incoming power spectrum.
pub const DEFAULT_PSD_SMOOTHING: f64 = 0.8;
/// Number of smoothed spectra searched for the per-bin minimum.
pub const DEFAULT_HISTORY_DEPTH: usize = 64;
/// Factor compensating the downward bias of a minimum over a window.
pub const DEFAULT_BIAS_COMPENSATION: f64 = 1.2;

/// Smoothing of the a posteriori SNR across frames.
pub const DEFAULT_SNR_SMOOTHING: f64 = 0.15;
/// Weight of the previous a priori SNR in the decision-directed estimate.
pub const DEFAULT_DECISION_DIRECTED_SMOOTHING: f64 = 0.35;

/// Value every history slot holds before the first update.
pub const HISTORY_INIT: f64 = 1.0;
/// Lower bound on the noise estimate, also its initial value.
pub const NOISE_FLOOR: f64 = 1e-10;
/// Initial a posteriori SNR.
pub const SNR_FLOOR: f64 = 1e-10;
/// Lower bound on the instantaneous SNR excess in the a priori estimate.
pub const XI_FLOOR: f64 = 1e-10;

/// Stride between consecutive frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HopStrategy {
    /// 50% overlap: frames advance by `N / 2` and are overlap-added.
    #[default]
    HalfFrame,
    /// No overlap: frames advance by `N` and are written back to back.
    FullFrame,
}

impl HopStrategy {
    /// Hop length in samples for a frame of `frame_size` samples.
    pub fn hop(self, frame_size: usize) -> usize {
        match self {
            Self::HalfFrame => frame_size / 2,
            Self::FullFrame => frame_size,
        }
    }
}

/// Minimum-statistics noise estimator settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseEstimatorConfig {
    /// Depth `D` of the per-bin history searched for the minimum (default: 64).
    pub history_depth: usize,
    /// Leaky-integrator coefficient `alpha` in `[0, 1)` (default: 0.8).
    pub smoothing_factor: f64,
    /// Multiplier applied to the minimum, `> 0` (default: 1.2).
    pub bias_compensation: f64,
}

impl Default for NoiseEstimatorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            smoothing_factor: DEFAULT_PSD_SMOOTHING,
            bias_compensation: DEFAULT_BIAS_COMPENSATION,
        }
    }
}

/// Decision-directed Wiener filter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct WienerFilterConfig {
    /// Weight of the previous a posteriori SNR, in `[0, 1)` (default: 0.15).
    pub snr_smoothing: f64,
    /// Weight of the previous a priori SNR, in `[0, 1)` (default: 0.35).
    pub decision_directed_smoothing: f64,
}

impl Default for WienerFilterConfig {
    fn default() -> Self {
        Self {
            snr_smoothing: DEFAULT_SNR_SMOOTHING,
            decision_directed_smoothing: DEFAULT_DECISION_DIRECTED_SMOOTHING,
        }
    }
}
