//! [`SpectralTransform`] backed by the `realfft` planner.

use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::{Complex64, SpectralTransform, TransformError, check_len};

/// Real FFT of a fixed size, planned once at construction.
///
/// Owns its own input and scratch buffers so callers can hand in borrowed,
/// immutable frames: `realfft` uses its input as workspace.
#[derive(derive_more::Debug)]
pub struct RealFft {
    size: usize,
    #[debug(skip)]
    forward: Arc<dyn RealToComplex<f64>>,
    #[debug(skip)]
    inverse: Arc<dyn ComplexToReal<f64>>,
    #[debug(skip)]
    time_buffer: Vec<f64>,
    #[debug(skip)]
    freq_buffer: Vec<Complex64>,
    #[debug(skip)]
    forward_scratch: Vec<Complex64>,
    #[debug(skip)]
    inverse_scratch: Vec<Complex64>,
}

impl RealFft {
    /// Plans forward and inverse transforms of `size` points.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or odd.
    pub fn new(size: usize) -> Self {
        assert!(
            size >= 2 && size % 2 == 0,
            "transform size must be even and non-zero, got {size}"
        );
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Self {
            size,
            time_buffer: forward.make_input_vec(),
            freq_buffer: forward.make_output_vec(),
            forward_scratch: forward.make_scratch_vec(),
            inverse_scratch: inverse.make_scratch_vec(),
            forward,
            inverse,
        }
    }
}

impl SpectralTransform for RealFft {
    fn size(&self) -> usize {
        self.size
    }

    fn forward(&mut self, frame: &[f64], spectrum: &mut [Complex64]) -> Result<(), TransformError> {
        check_len(self.size, frame.len())?;
        check_len(self.num_bins(), spectrum.len())?;

        self.time_buffer.copy_from_slice(frame);
        self.forward
            .process_with_scratch(&mut self.time_buffer, spectrum, &mut self.forward_scratch)?;
        Ok(())
    }

    fn inverse(&mut self, spectrum: &[Complex64], frame: &mut [f64]) -> Result<(), TransformError> {
        check_len(self.num_bins(), spectrum.len())?;
        check_len(self.size, frame.len())?;

        self.freq_buffer.copy_from_slice(spectrum);
        // DC and Nyquist bins of a real signal carry no imaginary part.
        let last = self.freq_buffer.len() - 1;
        self.freq_buffer[0].im = 0.0;
        self.freq_buffer[last].im = 0.0;
        self.inverse
            .process_with_scratch(&mut self.freq_buffer, frame, &mut self.inverse_scratch)?;
        Ok(())
    }
}
