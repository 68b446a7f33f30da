//! Denoiser configuration.

pub use murmur_ns::config::{HopStrategy, NoiseEstimatorConfig, WienerFilterConfig};

/// Top-level configuration for the denoising pipeline.
///
/// The frame size is not part of the config: it is the length of the window
/// handed to [`DenoiserBuilder::window`](crate::DenoiserBuilder::window).
///
/// # Example
///
/// ```
/// use murmur::Config;
/// use murmur::config::{HopStrategy, NoiseEstimatorConfig};
///
/// let config = Config {
///     hop: HopStrategy::FullFrame,
///     noise_estimator: NoiseEstimatorConfig {
///         history_depth: 32,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(config.wiener_filter.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Frame advance: half-frame overlap-add (default) or back-to-back frames.
    pub hop: HopStrategy,
    /// Minimum-statistics noise estimator settings.
    pub noise_estimator: NoiseEstimatorConfig,
    /// Wiener filter settings. `None` bypasses the filter (unity gain in
    /// every bin), which turns the pipeline into a pure analysis/synthesis
    /// round trip.
    pub wiener_filter: Option<WienerFilterConfig>,
    /// Keep every windowed frame, spectrum, signal PSD and noise PSD of the
    /// run in [`DenoiseOutput::intermediates`](crate::DenoiseOutput::intermediates)
    /// (default: true).
    pub record_intermediates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hop: HopStrategy::HalfFrame,
            noise_estimator: NoiseEstimatorConfig::default(),
            wiener_filter: Some(WienerFilterConfig::default()),
            record_intermediates: true,
        }
    }
}

impl Config {
    /// Checks value ranges, returning a description of the first violation.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let ne = &self.noise_estimator;
        if ne.history_depth == 0 {
            return Err("noise estimator history depth must be at least 1".into());
        }
        check_smoothing("noise estimator smoothing factor", ne.smoothing_factor)?;
        if !(ne.bias_compensation.is_finite() && ne.bias_compensation > 0.0) {
            return Err(format!(
                "bias compensation must be finite and positive, got {}",
                ne.bias_compensation
            ));
        }
        if let Some(wf) = &self.wiener_filter {
            check_smoothing("Wiener SNR smoothing", wf.snr_smoothing)?;
            check_smoothing(
                "Wiener decision-directed smoothing",
                wf.decision_directed_smoothing,
            )?;
        }
        Ok(())
    }
}

fn check_smoothing(name: &str, value: f64) -> Result<(), String> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must lie in [0, 1), got {value}"))
    }
}
