//! Signal routing between oscillators, groups and the output device.
//!
//! Routing is fixed: oscillators feed their group, the group gain feeds one
//! or both bus inputs, and the bus applies master gain and the single reverb
//! send.

/// Shared mix bus, effect send and master gain.
pub mod bus;
/// Core rendering trait and context.
pub mod node;

pub use bus::{Destination, EffectParam, OutputBus};
pub use node::{GraphNode, RenderCtx};
