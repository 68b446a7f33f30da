//! Text artifacts and sample files.
//!
//! Frame files start with a header line such as
//! `frameSize=256,numFrames=31,type=double` followed by one comma-separated
//! row per frame. Complex rows interleave real and imaginary parts. Sample
//! files hold one signed Q15 word per line, either as a 16-digit binary
//! string or as a hex number.

mod frame_file;
mod sample_file;

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

pub use frame_file::{
    read_frames, read_frames_from, read_signal, read_signal_from, read_spectra,
    read_spectra_from, write_frames, write_frames_to, write_signal, write_signal_to,
    write_spectra, write_spectra_to,
};
pub use sample_file::{
    read_binary_samples, read_binary_samples_from, read_hex_samples, read_hex_samples_from,
};

use crate::{DenoiseOutput, Error};

/// Windowed frames of a run.
pub const FRAMES_FILE: &str = "output_frames.txt";
/// Scaled forward spectra.
pub const SPECTRA_FILE: &str = "output_fft.txt";
/// Signal power spectra.
pub const SIGNAL_PSD_FILE: &str = "output_psd_signal.txt";
/// Noise PSD estimates.
pub const NOISE_PSD_FILE: &str = "output_psd_est_noise.txt";
/// Reconstructed signal.
pub const SIGNAL_FILE: &str = "output_recon_signal.txt";

/// Layout problems found while reading or writing a file.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The file has no header line.
    MissingHeader,
    /// The header line could not be parsed or declares zero frames.
    InvalidHeader(String),
    /// The header's element type tag is not the one being read.
    UnsupportedType { expected: &'static str, found: String },
    /// A row holds the wrong number of values.
    FrameLengthMismatch {
        frame: usize,
        expected: usize,
        actual: usize,
    },
    /// The number of rows differs from the header's `numFrames`.
    FrameCountMismatch { expected: usize, actual: usize },
    /// Frames handed to a writer do not all have the same length.
    InconsistentFrameLength {
        frame: usize,
        expected: usize,
        actual: usize,
    },
    /// A value on a data row is not a number.
    InvalidValue { line: usize, value: String },
    /// A sample file line is not a valid word.
    InvalidSample { line: usize, value: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "missing header line"),
            Self::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
            Self::UnsupportedType { expected, found } => {
                write!(f, "unsupported element type {found:?}, expected {expected:?}")
            }
            Self::FrameLengthMismatch {
                frame,
                expected,
                actual,
            } => write!(
                f,
                "frame {frame} holds {actual} values, expected {expected}"
            ),
            Self::FrameCountMismatch { expected, actual } => {
                write!(f, "found {actual} frames, header declares {expected}")
            }
            Self::InconsistentFrameLength {
                frame,
                expected,
                actual,
            } => write!(
                f,
                "frame {frame} has length {actual}, first frame has {expected}"
            ),
            Self::InvalidValue { line, value } => {
                write!(f, "line {line}: {value:?} is not a number")
            }
            Self::InvalidSample { line, value } => {
                write!(f, "line {line}: {value:?} is not a Q15 sample")
            }
        }
    }
}

impl std::error::Error for FormatError {}

impl Error {
    /// Fills in the path of an I/O error raised by a stream reader or writer.
    pub(crate) fn at(self, path: &Path) -> Self {
        match self {
            Self::Io { source, .. } => Self::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

pub(crate) fn io_error(source: io::Error) -> Error {
    Error::Io {
        path: PathBuf::new(),
        source,
    }
}

pub(crate) fn open(path: &Path) -> Result<BufReader<File>, Error> {
    File::open(path).map(BufReader::new).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the five text artifacts of a run into `dir`, creating it if
/// needed.
///
/// Without recorded intermediates only the reconstructed signal is written.
/// Empty collections produce no file.
pub fn write_artifacts(dir: impl AsRef<Path>, output: &DenoiseOutput) -> Result<(), Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    if let Some(rec) = &output.intermediates {
        write_frames(dir.join(FRAMES_FILE), &rec.frames)?;
        write_spectra(dir.join(SPECTRA_FILE), &rec.spectra)?;
        write_frames(dir.join(SIGNAL_PSD_FILE), &rec.signal_psd)?;
        write_frames(dir.join(NOISE_PSD_FILE), &rec.noise_psd)?;
    }
    write_signal(dir.join(SIGNAL_FILE), &output.signal)?;

    tracing::debug!(dir = %dir.display(), "artifacts written");
    Ok(())
}
