//! Windowed frame extraction.

/// Cuts fixed-size windowed frames out of a sample buffer.
///
/// The frame size `N` is the window length. No windowing is applied beyond
/// the supplied coefficients: pass a Hann window for overlap-add processing
/// or a unity window for back-to-back frames.
#[derive(Debug, Clone)]
pub struct Framer {
    window: Vec<f32>,
}

impl Framer {
    /// Creates a framer from window coefficients.
    ///
    /// # Panics
    ///
    /// Panics if `window` is empty.
    pub fn new(window: Vec<f32>) -> Self {
        assert!(!window.is_empty(), "window must not be empty");
        Self { window }
    }

    /// Frame size `N`.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.window.len()
    }

    /// Window coefficients.
    pub fn window(&self) -> &[f32] {
        &self.window
    }

    /// Writes `samples[start_index + i] * window[i]` into `frame[i]` for
    /// `i` in `0..N`. The product is taken in single precision and widened.
    ///
    /// # Panics
    ///
    /// Panics if `frame.len() != N` or `start_index + N > samples.len()`.
    pub fn generate_frame(&self, samples: &[f32], start_index: usize, frame: &mut [f64]) {
        let n = self.frame_size();
        assert_eq!(frame.len(), n, "frame buffer length");
        assert!(
            start_index + n <= samples.len(),
            "frame at offset {start_index} needs {n} samples, only {} available",
            samples.len().saturating_sub(start_index)
        );

        for ((out, &x), &w) in frame
            .iter_mut()
            .zip(&samples[start_index..start_index + n])
            .zip(&self.window)
        {
            *out = f64::from(x * w);
        }
    }
}
