//! Benchmarks for per-sample ramp evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shepard_dsp::dsp::ramp::LinearRamp;

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");
    let dt = 1.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        // Mid-segment: interpolation on every read
        let mut ramp = LinearRamp::new(110.0);
        ramp.ramp_to(0.0, 220.0, 1.0);
        group.bench_with_input(BenchmarkId::new("interpolating", size), &size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for i in 0..n {
                    sum += ramp.value_at(black_box(0.25 + i as f64 * dt));
                }
                sum
            })
        });

        // Settled: early return on every read
        let ramp = LinearRamp::new(0.5);
        group.bench_with_input(BenchmarkId::new("settled", size), &size, |b, &n| {
            b.iter(|| {
                let mut sum = 0.0;
                for i in 0..n {
                    sum += ramp.value_at(black_box(i as f64 * dt));
                }
                sum
            })
        });
    }

    group.finish();
}
