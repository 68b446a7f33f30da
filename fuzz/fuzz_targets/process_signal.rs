#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use murmur::config::{HopStrategy, NoiseEstimatorConfig};
use murmur::{Config, Denoiser, window};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Frame size exponent: 2^(1 + n % 9), so 2..=512.
    frame_size_exp: u8,
    no_overlap: bool,
    bypass: bool,
    /// History depth (clamped to 1-128).
    history_depth: u8,
    /// Samples are used as is, non-finite values included.
    samples: Vec<f32>,
}

fuzz_target!(|input: FuzzInput| {
    let frame_size = 1usize << (1 + input.frame_size_exp % 9);
    let (hop, coeffs) = if input.no_overlap {
        (HopStrategy::FullFrame, window::rectangular(frame_size))
    } else {
        (HopStrategy::HalfFrame, window::hann(frame_size))
    };
    let config = Config {
        hop,
        noise_estimator: NoiseEstimatorConfig {
            history_depth: usize::from(input.history_depth % 128) + 1,
            ..Default::default()
        },
        wiener_filter: if input.bypass {
            None
        } else {
            Config::default().wiener_filter
        },
        record_intermediates: true,
    };

    let mut denoiser = Denoiser::builder()
        .config(config)
        .window(coeffs)
        .build()
        .expect("valid configuration");
    let output = denoiser.process(&input.samples).expect("in-memory run");

    assert_eq!(output.signal.len(), input.samples.len());
    let rec = output.intermediates.expect("recording enabled");
    assert_eq!(rec.frames.len(), output.stats.frames_processed);
    // The noise estimate must stay usable as a divisor whatever the input.
    for noise in rec.noise_psd.iter().flatten() {
        assert!(!(*noise <= 0.0), "non-positive noise estimate {noise}");
    }
});
