//! Low-level DSP primitives used by the oscillator bank.
//!
//! These components are realtime-safe once constructed: no allocation, no
//! locking, no I/O. They stay focused on signal math so the `synth` layer can
//! handle orchestration and timing.

/// Waveforms and the phase-accumulating oscillator core.
pub mod oscillator;
/// Time-addressed linear ramps for frequency and gain automation.
pub mod ramp;
/// Chowning-style reverb used as the effect send.
pub mod reverb;
/// Exponential sweep and masking envelope math.
pub mod sweep;

pub use oscillator::{OscillatorBlock, Waveform};
pub use ramp::LinearRamp;
pub use reverb::Reverb;
pub use sweep::{Direction, Envelope, EnvelopeShape, Sweep};
