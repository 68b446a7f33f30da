#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

mod real_fft;

use std::fmt;

pub use realfft::FftError;
pub use realfft::num_complex::Complex64;
pub use real_fft::RealFft;

/// Error returned by a [`SpectralTransform`].
#[derive(Debug)]
pub enum TransformError {
    /// A buffer handed to the transform has the wrong length.
    LengthMismatch { expected: usize, actual: usize },
    /// The transform backend rejected the input.
    Backend(FftError),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "transform buffer has length {actual}, expected {expected}")
            }
            Self::Backend(err) => write!(f, "transform backend failed: {err}"),
        }
    }
}

impl std::error::Error for TransformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            Self::LengthMismatch { .. } => None,
        }
    }
}

impl From<FftError> for TransformError {
    fn from(err: FftError) -> Self {
        Self::Backend(err)
    }
}

/// Fixed-size real-input transform pair.
///
/// Both directions are unscaled: `inverse(forward(x)) == N * x`.
pub trait SpectralTransform: fmt::Debug {
    /// Transform size `N` (number of time-domain samples).
    fn size(&self) -> usize;

    /// Number of spectral bins, `N / 2 + 1`.
    fn num_bins(&self) -> usize {
        self.size() / 2 + 1
    }

    /// Real-to-complex transform of `frame` (length `N`) into `spectrum`
    /// (length `N / 2 + 1`).
    fn forward(&mut self, frame: &[f64], spectrum: &mut [Complex64]) -> Result<(), TransformError>;

    /// Complex-to-real transform of `spectrum` (length `N / 2 + 1`) into
    /// `frame` (length `N`).
    fn inverse(&mut self, spectrum: &[Complex64], frame: &mut [f64]) -> Result<(), TransformError>;
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::LengthMismatch { expected, actual })
    }
}
