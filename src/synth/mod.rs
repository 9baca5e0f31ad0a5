// Purpose: Oscillator bank, groups and the stepping session
// This layer sits above the dsp primitives and the output bus

pub mod group;
pub mod message;
pub mod oscillator;
pub mod session;
pub mod snapshot;

pub use group::OscillatorGroup;
pub use message::{MessageReceiver, ToneMessage};
pub use oscillator::Oscillator;
pub use session::{SessionState, ToneSession};
pub use snapshot::{Snapshot, ToneValue};

/// Clamp a user control to `[0, 1]`, logging when the value had to change.
/// NaN maps to 0.
pub(crate) fn clamp_unit(what: &str, value: f64) -> f64 {
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    if clamped != value {
        log::warn!("{what} {value} clamped to {clamped}");
    }
    clamped
}
