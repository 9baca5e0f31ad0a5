//! Real-world scenario benchmarks.
//!
//! These benchmarks model the default Shepard setup: four groups of eight
//! oscillators stepping every 100ms and rendering through the bus.

mod session;

pub use session::{bench_render, bench_step};
