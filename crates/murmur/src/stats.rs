//! Per-run statistics.

/// Statistics from one [`Denoiser::process`](crate::Denoiser::process) run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenoiseStats {
    /// Frame size `N` in samples.
    pub frame_size: usize,
    /// Frame advance in samples.
    pub hop: usize,
    /// Number of full frames processed.
    pub frames_processed: usize,
    /// Trailing input samples after the end of the last processed frame.
    /// Equals the input length when the input is shorter than one frame.
    pub dropped_samples: usize,
    /// Total number of (frame, bin) pairs whose Wiener gain was forced to
    /// zero because the a priori SNR was not finite.
    pub degenerate_bins: usize,
}
