//! Benchmarks for stepping and rendering a running session.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shepard_dsp::{ToneConfig, ToneSession};

use crate::BLOCK_SIZES;

fn running_session(sample_rate: f32) -> ToneSession {
    let mut session = match ToneSession::new(&ToneConfig::default(), sample_rate) {
        Ok(session) => session,
        Err(err) => panic!("default config must build: {err}"),
    };
    session.start(0.0);
    session.step(0.0, 0.1);
    session
}

pub fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/step");
    let mut session = running_session(48_000.0);
    let interval = session.step_interval();

    // One step of every group: curve evaluation, ramps, snapshot
    let mut time = 0.0;
    group.bench_function("default_config", |b| {
        b.iter(|| {
            time += interval;
            black_box(session.step(black_box(time), time + interval).is_some())
        })
    });

    group.finish();
}

pub fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/render");
    let sample_rate = 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut session = running_session(sample_rate);
        let block_time = size as f64 / sample_rate as f64;

        // All groups through the mix bus, reverb and master gain
        let mut time = 0.0;
        group.bench_with_input(BenchmarkId::new("default_config", size), &size, |b, _| {
            b.iter(|| {
                session.render(black_box(&mut buffer), time, sample_rate);
                time += block_time;
            })
        });
    }

    group.finish();
}
