//! Benchmarks for the denoising pipeline and its stages.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use murmur::config::{HopStrategy, NoiseEstimatorConfig, WienerFilterConfig};
use murmur::{Complex64, Config, Denoiser};
use murmur_fft::{RealFft, SpectralTransform};
use murmur_ns::{NoiseEstimator, WienerFilter};
use murmur_proptest::generators::noisy_tone;

const SAMPLE_RATE: f32 = 16_000.0;

fn noisy_signal(len: usize) -> Vec<f32> {
    noisy_tone(len, 440.0, SAMPLE_RATE, 0.1, 12_345)
}

// ---------------------------------------------------------------------------
// Full pipeline
// ---------------------------------------------------------------------------

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    let samples = noisy_signal(SAMPLE_RATE as usize);
    group.throughput(Throughput::Elements(samples.len() as u64));

    for frame_size in [256, 512, 1024] {
        let mut denoiser = Denoiser::builder()
            .config(Config {
                record_intermediates: false,
                ..Default::default()
            })
            .window(murmur::window::hann(frame_size))
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::new("overlap_add", frame_size),
            &samples,
            |b, samples| b.iter(|| denoiser.process(black_box(samples)).unwrap()),
        );
    }

    let mut denoiser = Denoiser::builder()
        .config(Config {
            hop: HopStrategy::FullFrame,
            record_intermediates: false,
            ..Default::default()
        })
        .window(murmur::window::rectangular(256))
        .build()
        .unwrap();
    group.bench_function("no_overlap/256", |b| {
        b.iter(|| denoiser.process(black_box(&samples)).unwrap());
    });

    let mut denoiser = Denoiser::with_hann(256).unwrap();
    group.bench_function("recording/256", |b| {
        b.iter(|| denoiser.process(black_box(&samples)).unwrap());
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");
    let n = 256;
    let bins = n / 2 + 1;

    let frame: Vec<f64> = noisy_signal(n).iter().map(|&x| f64::from(x)).collect();
    let mut spectrum = vec![Complex64::new(0.0, 0.0); bins];
    let mut fft = RealFft::new(n);
    group.bench_function("forward_fft", |b| {
        b.iter(|| fft.forward(black_box(&frame), &mut spectrum).unwrap());
    });

    let mut out = vec![0.0; n];
    group.bench_function("inverse_fft", |b| {
        b.iter(|| fft.inverse(black_box(&spectrum), &mut out).unwrap());
    });

    let psd: Vec<f64> = spectrum.iter().map(|c| c.norm_sqr() / (n * n) as f64).collect();
    let mut estimator = NoiseEstimator::new(bins, &NoiseEstimatorConfig::default());
    group.bench_function("noise_estimator_update", |b| {
        b.iter(|| estimator.update(black_box(&psd)));
    });

    let noise = vec![1e-4; bins];
    let mut filter = WienerFilter::new(n, &WienerFilterConfig::default());
    let mut filtered = vec![Complex64::new(0.0, 0.0); bins];
    group.bench_function("wiener_filter_apply", |b| {
        b.iter(|| filter.apply(black_box(&spectrum), &psd, &noise, &mut filtered));
    });

    group.finish();
}

criterion_group!(benches, bench_process, bench_stages);
criterion_main!(benches);
