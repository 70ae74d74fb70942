//! Filter benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mbc_dsp::MonoProcessor;
use mbc_dsp::biquad::{BUTTERWORTH_Q, BiquadCoeffs, BiquadTDF2};
use mbc_dsp::crossover::LinkwitzRiley;

fn bench_biquad_scalar(c: &mut Criterion) {
    let mut filter = BiquadTDF2::with_coeffs(BiquadCoeffs::lowpass(1000.0, BUTTERWORTH_Q, 48000.0));

    let mut buffer: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.01).sin()).collect();

    c.bench_function("biquad_scalar_1024", |b| {
        b.iter(|| {
            filter.process_block(black_box(&mut buffer));
        })
    });
}

fn bench_linkwitz_riley(c: &mut Criterion) {
    let mut xover = LinkwitzRiley::new();
    xover.prepare(48000.0, 1024, 1);
    xover.set_frequency(1000.0);

    let buffer: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.01).sin()).collect();

    c.bench_function("linkwitz_riley_split_1024", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for &sample in &buffer {
                let (low, high) = xover.process_sample(0, black_box(sample));
                acc += low - high;
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_biquad_scalar, bench_linkwitz_riley);
criterion_main!(benches);
