use criterion::{black_box, criterion_group, criterion_main, Criterion};

use waveform_insight::audio::{AnalysisOptions, AudioAnalyzer, SampleBuffer, SpectralAnalyzer};
use waveform_insight::profiles::Profile;

fn test_buffer(seconds: usize) -> SampleBuffer {
    let sample_rate = 44100;
    let samples = (0..sample_rate * seconds)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            // Tone that swells and fades once per second
            let envelope = (std::f32::consts::PI * t).sin().abs();
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * envelope
        })
        .collect();
    SampleBuffer::new(samples, sample_rate as u32)
}

fn bench_full_analysis(c: &mut Criterion) {
    let buffer = test_buffer(10);
    let analyzer = AudioAnalyzer::with_options(AnalysisOptions {
        profiles: Profile::builtin(),
        ..Default::default()
    });

    c.bench_function("analyze 10s with builtin profiles", |b| {
        b.iter(|| analyzer.analyze(black_box(&buffer)).unwrap())
    });
}

fn bench_spectrum(c: &mut Criterion) {
    let buffer = test_buffer(1);
    let mut spectral = SpectralAnalyzer::new(2048).unwrap();

    c.bench_function("spectrum 2048", |b| {
        b.iter(|| spectral.analyze(black_box(&buffer.samples), 44100).unwrap())
    });
}

criterion_group!(benches, bench_full_analysis, bench_spectrum);
criterion_main!(benches);
