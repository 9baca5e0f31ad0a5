//! Realtime Shepard tone engine.
//!
//! A bank of phase-offset oscillators sweeps exponentially through a fixed
//! number of octaves and wraps modulo a period, masked by a bell-shaped
//! volume envelope so the wrap is inaudible.
//!
//! Layers, leaves first:
//! - [`dsp`]: waveforms, linear ramps, sweep math, reverb
//! - [`graph`]: render context and the shared output bus
//! - [`synth`]: oscillators, groups and the stepping session
//! - [`engine`]: audio-thread engine with lock-free control and snapshot rings

pub mod config;
pub mod dsp;
#[cfg(feature = "rtrb")]
pub mod engine;
pub mod error;
pub mod graph; // Output bus and render context
pub mod synth; // Oscillator bank and stepping

pub use config::{GroupConfig, ReverbConfig, ToneConfig};
pub use error::{Error, Result};
pub use synth::{
    session::{SessionState, ToneSession},
    snapshot::{Snapshot, ToneValue},
};

#[cfg(feature = "rtrb")]
pub use engine::{ShepardEngine, SnapshotReceiver, ToneHandle};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Lowest frequency a sweep target is clamped to, in Hz.
pub(crate) const MIN_FREQUENCY: f64 = 1e-3;
