//! Frame loop tying the framer, transform, noise estimator, Wiener filter
//! and overlap-add together.

use std::fmt;
use std::io;
use std::path::PathBuf;

use murmur_fft::{Complex64, RealFft, SpectralTransform, TransformError};
use murmur_ns::{Framer, NoiseEstimator, OverlapAdd, WienerFilter};
use tracing::{debug, trace};

use crate::config::Config;
use crate::io::FormatError;
use crate::stats::DenoiseStats;

/// Errors returned by the denoiser and its file I/O.
#[derive(Debug)]
pub enum Error {
    /// The analysis window cannot be used for framing.
    InvalidWindow(String),
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// The spectral transform failed.
    Transform(TransformError),
    /// Reading or writing a file failed.
    Io { path: PathBuf, source: io::Error },
    /// A file did not have the expected layout.
    Format(FormatError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWindow(msg) => write!(f, "invalid window: {msg}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Transform(err) => write!(f, "spectral transform failed: {err}"),
            Self::Io { path, source } if path.as_os_str().is_empty() => write!(f, "{source}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Format(err) => write!(f, "malformed file: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transform(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Format(err) => Some(err),
            Self::InvalidWindow(_) | Self::InvalidConfig(_) => None,
        }
    }
}

impl From<TransformError> for Error {
    fn from(err: TransformError) -> Self {
        Self::Transform(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

/// Per-frame data kept when [`Config::record_intermediates`] is set.
///
/// Every vector holds one entry per processed frame, in frame order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intermediates {
    /// Windowed time-domain frames (`N` samples each).
    pub frames: Vec<Vec<f64>>,
    /// Spectra after `1/N` scaling, before filtering (`N / 2 + 1` bins each).
    pub spectra: Vec<Vec<Complex64>>,
    /// Power spectra `|X[k]|^2`.
    pub signal_psd: Vec<Vec<f64>>,
    /// Noise PSD estimates after each frame's update.
    pub noise_psd: Vec<Vec<f64>>,
}

impl Intermediates {
    fn with_capacity(frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(frames),
            spectra: Vec::with_capacity(frames),
            signal_psd: Vec::with_capacity(frames),
            noise_psd: Vec::with_capacity(frames),
        }
    }
}

/// Result of one [`Denoiser::process`] run.
#[derive(Debug, Clone)]
pub struct DenoiseOutput {
    /// Reconstructed signal, same length as the input. Samples not covered
    /// by the overlap-add stay zero.
    pub signal: Vec<f64>,
    /// Per-frame data, if recording was enabled.
    pub intermediates: Option<Intermediates>,
    /// Run statistics.
    pub stats: DenoiseStats,
}

/// Builder for [`Denoiser`].
#[derive(Debug, Default)]
pub struct DenoiserBuilder {
    config: Config,
    window: Option<Vec<f32>>,
    transform: Option<Box<dyn SpectralTransform + Send>>,
}

impl DenoiserBuilder {
    /// Sets the pipeline configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the analysis window. Its length is the frame size `N`.
    pub fn window(mut self, window: Vec<f32>) -> Self {
        self.window = Some(window);
        self
    }

    /// Replaces the default [`RealFft`] transform. The transform size must
    /// equal the window length.
    pub fn transform(mut self, transform: Box<dyn SpectralTransform + Send>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Validates the window and configuration and builds the denoiser.
    pub fn build(self) -> Result<Denoiser, Error> {
        let window = self
            .window
            .ok_or_else(|| Error::InvalidWindow("no window supplied".into()))?;
        validate_window(&window)?;
        self.config.validate().map_err(Error::InvalidConfig)?;

        let frame_size = window.len();
        let transform = match self.transform {
            Some(transform) if transform.size() != frame_size => {
                return Err(Error::InvalidConfig(format!(
                    "transform size {} does not match frame size {frame_size}",
                    transform.size()
                )));
            }
            Some(transform) => transform,
            None => Box::new(RealFft::new(frame_size)),
        };

        let num_bins = frame_size / 2 + 1;
        debug!(
            frame_size,
            hop = self.config.hop.hop(frame_size),
            num_bins,
            history_depth = self.config.noise_estimator.history_depth,
            wiener = self.config.wiener_filter.is_some(),
            "denoiser created"
        );

        Ok(Denoiser {
            config: self.config,
            framer: Framer::new(window),
            transform,
            frame: vec![0.0; frame_size],
            spectrum: vec![Complex64::new(0.0, 0.0); num_bins],
            psd: vec![0.0; num_bins],
            filtered: vec![Complex64::new(0.0, 0.0); num_bins],
            reconstructed: vec![0.0; frame_size],
        })
    }
}

fn validate_window(window: &[f32]) -> Result<(), Error> {
    let n = window.len();
    if n < 2 || n % 2 != 0 {
        return Err(Error::InvalidWindow(format!(
            "length must be even and at least 2, got {n}"
        )));
    }
    if let Some(i) = window.iter().position(|w| !w.is_finite()) {
        return Err(Error::InvalidWindow(format!(
            "coefficient {i} is not finite ({})",
            window[i]
        )));
    }
    Ok(())
}

/// Single-channel STFT denoiser.
///
/// Each [`process`](Self::process) call is an independent run: noise
/// estimator, Wiener filter and overlap-add state start fresh, so the same
/// input always yields the same output.
#[derive(Debug)]
pub struct Denoiser {
    config: Config,
    framer: Framer,
    transform: Box<dyn SpectralTransform + Send>,
    frame: Vec<f64>,
    spectrum: Vec<Complex64>,
    psd: Vec<f64>,
    filtered: Vec<Complex64>,
    reconstructed: Vec<f64>,
}

impl Denoiser {
    /// Returns a builder with the default configuration and no window.
    pub fn builder() -> DenoiserBuilder {
        DenoiserBuilder::default()
    }

    /// Default configuration with a periodic Hann window of `frame_size`.
    pub fn with_hann(frame_size: usize) -> Result<Self, Error> {
        Self::builder()
            .window(murmur_common_audio::window::hann(frame_size))
            .build()
    }

    /// Frame size `N`.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.framer.frame_size()
    }

    /// Frame advance in samples.
    #[inline]
    pub fn hop(&self) -> usize {
        self.config.hop.hop(self.frame_size())
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Denoises `samples`.
    ///
    /// Frames start at `k * hop` for every `k` with `k * hop + N <= len`;
    /// a trailing partial frame is dropped. Inputs shorter than one frame
    /// produce an all-zero signal.
    pub fn process(&mut self, samples: &[f32]) -> Result<DenoiseOutput, Error> {
        let n = self.frame_size();
        let hop = self.hop();
        let num_bins = n / 2 + 1;
        let num_frames = if samples.len() >= n {
            (samples.len() - n) / hop + 1
        } else {
            0
        };

        let mut noise_estimator = NoiseEstimator::new(num_bins, &self.config.noise_estimator);
        let mut wiener_filter = self
            .config
            .wiener_filter
            .as_ref()
            .map(|config| WienerFilter::new(n, config));
        let mut overlap_add = OverlapAdd::new(n, self.config.hop, samples.len());
        let mut intermediates = self
            .config
            .record_intermediates
            .then(|| Intermediates::with_capacity(num_frames));
        let mut stats = DenoiseStats {
            frame_size: n,
            hop,
            ..Default::default()
        };

        let scale = 1.0 / n as f64;
        for frame_index in 0..num_frames {
            let start = frame_index * hop;
            trace!(frame_index, start, "processing frame");

            self.framer.generate_frame(samples, start, &mut self.frame);
            self.transform.forward(&self.frame, &mut self.spectrum)?;
            for bin in &mut self.spectrum {
                *bin *= scale;
            }
            for (p, bin) in self.psd.iter_mut().zip(&self.spectrum) {
                *p = bin.norm_sqr();
            }

            noise_estimator.update(&self.psd);
            match wiener_filter.as_mut() {
                Some(filter) => {
                    filter.apply(
                        &self.spectrum,
                        &self.psd,
                        noise_estimator.noise_estimate(),
                        &mut self.filtered,
                    );
                    stats.degenerate_bins += filter.degenerate_bins();
                }
                None => self.filtered.copy_from_slice(&self.spectrum),
            }

            self.transform.inverse(&self.filtered, &mut self.reconstructed)?;
            overlap_add.accumulate(&self.reconstructed);

            if let Some(rec) = intermediates.as_mut() {
                rec.frames.push(self.frame.clone());
                rec.spectra.push(self.spectrum.clone());
                rec.signal_psd.push(self.psd.clone());
                rec.noise_psd.push(noise_estimator.noise_estimate().to_vec());
            }
        }

        stats.frames_processed = num_frames;
        stats.dropped_samples = match num_frames {
            0 => samples.len(),
            k => samples.len() - ((k - 1) * hop + n),
        };
        debug!(
            samples = samples.len(),
            frames = stats.frames_processed,
            dropped = stats.dropped_samples,
            degenerate_bins = stats.degenerate_bins,
            "denoising run finished"
        );

        Ok(DenoiseOutput {
            signal: overlap_add.into_output(),
            intermediates,
            stats,
        })
    }
}
