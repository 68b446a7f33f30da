//! Single-channel STFT denoiser.
//!
//! Frames the input with a window, estimates the per-bin noise floor with
//! minimum statistics, attenuates every bin with a decision-directed Wiener
//! gain and reconstructs the signal by overlap-add.
//!
//! # Quick Start
//!
//! ```
//! use murmur::{Config, Denoiser};
//! use murmur::config::HopStrategy;
//!
//! let config = Config {
//!     hop: HopStrategy::HalfFrame,
//!     ..Default::default()
//! };
//! let window = murmur::window::hann(512);
//!
//! let mut denoiser = Denoiser::builder().config(config).window(window).build()?;
//! let noisy = vec![0.0f32; 48_000];
//! let output = denoiser.process(&noisy)?;
//! assert_eq!(output.signal.len(), noisy.len());
//! # Ok::<(), murmur::Error>(())
//! ```

pub mod config;
mod denoiser;
pub mod io;
pub mod stats;

pub use config::Config;
pub use denoiser::{DenoiseOutput, Denoiser, DenoiserBuilder, Error, Intermediates};
pub use murmur_common_audio::window;
pub use murmur_fft::Complex64;
pub use stats::DenoiseStats;
