//! Benchmarks for low-level DSP primitives.

mod oscillator;
mod ramp;
mod reverb;

pub use oscillator::bench_oscillator;
pub use ramp::bench_ramp;
pub use reverb::bench_reverb;
