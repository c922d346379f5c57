//! Performance benchmarks for relative mode estimation

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relative_mode::analysis::across_time::windowed_estimates;
use relative_mode::{
    estimate, relative_mode, rme_across_time, ChromaType, Chromagram, DistanceMetric, RmeConfig,
    TemplateBank,
};

fn triad(sample_rate: u32, seconds: f32) -> Vec<f32> {
    (0..(sample_rate as f32 * seconds) as usize)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            [261.63f32, 329.63, 392.0]
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin())
                .sum::<f32>()
                * 0.25
        })
        .collect()
}

fn bench_estimate(c: &mut Criterion) {
    let frames: Vec<Vec<f32>> = (0..2000)
        .map(|i| (0..12).map(|j| ((i * 7 + j * 5) % 13) as f32).collect())
        .collect();

    c.bench_function("estimate_2000_frames", |b| {
        b.iter(|| {
            let _ = estimate(black_box(&frames), "albrecht", TemplateBank::builtin());
        });
    });
}

fn bench_windowed(c: &mut Criterion) {
    // 5 minutes of chroma at 22050 Hz / 512 hop
    let frames: Vec<Vec<f32>> = (0..12920)
        .map(|i| (0..12).map(|j| ((i / 100 + j * 5) % 13) as f32).collect())
        .collect();
    let chroma = Chromagram::from_frames(frames, 22050, 512, ChromaType::Cens);
    let templates = TemplateBank::builtin().get_profile("albrecht").unwrap();

    c.bench_function("windowed_estimates_5min", |b| {
        b.iter(|| {
            let _ = windowed_estimates(
                black_box(chroma.clone()),
                3.0,
                1.0,
                templates,
                DistanceMetric::Cosine,
            );
        });
    });
}

fn bench_audio(c: &mut Criterion) {
    let samples = triad(22050, 10.0);

    c.bench_function("relative_mode_10s", |b| {
        b.iter(|| {
            let _ = relative_mode(black_box(&samples), black_box(22050), "simple");
        });
    });

    let config = RmeConfig::default();
    c.bench_function("rme_across_time_10s", |b| {
        b.iter(|| {
            let _ = rme_across_time(black_box(&samples), black_box(22050), &config);
        });
    });
}

criterion_group!(benches, bench_estimate, bench_windowed, bench_audio);
criterion_main!(benches);
