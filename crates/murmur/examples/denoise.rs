//! Denoise a recording and optionally dump every intermediate stage.
//!
//! Reads a WAV file or a Q15 text file (one binary or hex word per line),
//! writes the reconstructed signal as a 32-bit float WAV and, with
//! `--artifacts`, the frame, spectrum, PSD and noise estimate text files.
//!
//! ```sh
//! RUST_LOG=murmur=debug cargo run -p murmur --features examples --example denoise -- \
//!     audio_file.txt --format bin --window coeffs_hex.mem --artifacts out/
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing_subscriber::EnvFilter;

use murmur::config::HopStrategy;
use murmur::{Config, Denoiser, io, window};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    /// Guess from the file extension (`.wav`, `.mem`/`.hex`, otherwise binary).
    Auto,
    Wav,
    /// One 16-digit binary Q15 word per line.
    Bin,
    /// One hex Q15 word per line.
    Hex,
}

#[derive(Parser, Debug)]
#[command(about = "Single-channel STFT denoiser")]
struct Args {
    /// Input signal.
    input: PathBuf,

    /// Input file format.
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    format: InputFormat,

    /// Frame size for the generated window.
    #[arg(long, default_value_t = 256)]
    frame_size: usize,

    /// Hex window coefficient file; its length sets the frame size.
    #[arg(long, conflicts_with = "frame_size")]
    window: Option<PathBuf>,

    /// Back-to-back frames with a rectangular window instead of half-frame
    /// overlap-add with a Hann window.
    #[arg(long)]
    no_overlap: bool,

    /// Noise estimator history depth in frames.
    #[arg(long, default_value_t = 64)]
    history_depth: usize,

    /// Skip the Wiener filter (analysis/synthesis round trip only).
    #[arg(long)]
    bypass: bool,

    /// Sample rate written to the output WAV when the input is a text file.
    #[arg(long, default_value_t = 16_000)]
    sample_rate: u32,

    /// Output WAV path.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for the text artifacts.
    #[arg(long)]
    artifacts: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let (samples, sample_rate) = read_input(&args)?;
    println!(
        "Read {} samples from {}",
        samples.len(),
        args.input.display()
    );

    let hop = if args.no_overlap {
        HopStrategy::FullFrame
    } else {
        HopStrategy::HalfFrame
    };
    let coeffs = match &args.window {
        Some(path) => io::read_hex_samples(path)?,
        None if args.no_overlap => window::rectangular(args.frame_size),
        None => window::hann(args.frame_size),
    };

    let mut config = Config {
        hop,
        wiener_filter: if args.bypass {
            None
        } else {
            Config::default().wiener_filter
        },
        record_intermediates: args.artifacts.is_some(),
        ..Default::default()
    };
    config.noise_estimator.history_depth = args.history_depth;

    let mut denoiser = Denoiser::builder().config(config).window(coeffs).build()?;
    let output = denoiser.process(&samples)?;
    let stats = &output.stats;
    println!(
        "Processed {} frames (N={}, hop={}), dropped {} trailing samples, {} degenerate bins",
        stats.frames_processed,
        stats.frame_size,
        stats.hop,
        stats.dropped_samples,
        stats.degenerate_bins
    );

    if let Some(dir) = &args.artifacts {
        io::write_artifacts(dir, &output)?;
        println!("Artifacts written to {}", dir.display());
    }

    if let Some(path) = &args.output {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for &sample in &output.signal {
            writer.write_sample(sample as f32)?;
        }
        writer.finalize()?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn read_input(args: &Args) -> Result<(Vec<f32>, u32)> {
    let format = match args.format {
        InputFormat::Auto => match args.input.extension().and_then(|e| e.to_str()) {
            Some("wav") => InputFormat::Wav,
            Some("mem" | "hex") => InputFormat::Hex,
            _ => InputFormat::Bin,
        },
        other => other,
    };

    match format {
        InputFormat::Wav => read_wav(args),
        InputFormat::Hex => Ok((io::read_hex_samples(&args.input)?, args.sample_rate)),
        InputFormat::Bin | InputFormat::Auto => {
            Ok((io::read_binary_samples(&args.input)?, args.sample_rate))
        }
    }
}

/// First channel of a WAV file, normalized to `[-1, 1)`.
fn read_wav(args: &Args) -> Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("unsupported bit depth {}", spec.bits_per_sample);
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let samples = interleaved.into_iter().step_by(channels.max(1)).collect();
    Ok((samples, spec.sample_rate))
}
