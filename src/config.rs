//! Session configuration.
//!
//! The default layout has `components` ascending groups
//! at `base_frequency · 2^i`, followed by the same number of descending
//! groups at the same base frequencies. Ascending groups start audible, the
//! descending ones start muted.
//!
//! # Example
//!
//! ```
//! use shepard_dsp::{dsp::Waveform, ToneConfig};
//!
//! let config = ToneConfig::shepard(55.0, 1)
//!     .with_period(40.0)
//!     .with_waveform(Waveform::Sine);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.groups.len(), 2);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        oscillator::Waveform,
        sweep::{Direction, Envelope, Sweep},
    },
    error::{Error, Result},
};

pub const DEFAULT_BASE_FREQUENCY: f64 = 27.5;
pub const DEFAULT_COMPONENTS: usize = 2;
pub const DEFAULT_OCTAVE_COUNT: usize = 8;
/// Seconds for one full sweep cycle.
pub const DEFAULT_PERIOD: f64 = 60.0;
/// Seconds between steps.
pub const DEFAULT_STEP_INTERVAL: f64 = 0.1;
pub const DEFAULT_MASTER_VOLUME: f64 = 0.5;
pub const DEFAULT_ASCENDING_GAIN: f64 = 0.5;
pub const DEFAULT_DESCENDING_GAIN: f64 = 0.0;

/// One oscillator group: where it starts and which way it sweeps.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupConfig {
    pub base_frequency: f64,
    pub direction: Direction,
    /// Initial mix gain, clamped to `[0, 1]`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gain: f64,
}

impl GroupConfig {
    pub fn new(base_frequency: f64, direction: Direction, gain: f64) -> Self {
        Self {
            base_frequency,
            direction,
            gain,
        }
    }

    pub fn ascending(base_frequency: f64) -> Self {
        Self::new(base_frequency, Direction::Ascending, DEFAULT_ASCENDING_GAIN)
    }

    pub fn descending(base_frequency: f64) -> Self {
        Self::new(base_frequency, Direction::Descending, DEFAULT_DESCENDING_GAIN)
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }
}

/// Reverb send settings, each in `[0, 1]`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbConfig {
    pub room_size: f64,
    pub damping: f64,
    pub wet: f64,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.2,
            wet: 0.35,
        }
    }
}

/// Everything needed to build a [`ToneSession`](crate::synth::session::ToneSession).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ToneConfig {
    pub groups: Vec<GroupConfig>,
    /// Oscillators per group, one per octave spanned.
    pub octave_count: usize,
    /// Duration of one full sweep cycle, seconds.
    pub period: f64,
    /// Seconds between steps.
    pub step_interval: f64,
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub master_volume: f64,
    pub reverb: ReverbConfig,
}

impl ToneConfig {
    /// Standard layout: `components` ascending groups then `components`
    /// descending groups, the i-th of each at `base_frequency · 2^i`.
    pub fn shepard(base_frequency: f64, components: usize) -> Self {
        let ascending = (0..components)
            .map(|i| GroupConfig::ascending(base_frequency * 2.0_f64.powi(i as i32)));
        let descending = (0..components)
            .map(|i| GroupConfig::descending(base_frequency * 2.0_f64.powi(i as i32)));

        Self {
            groups: ascending.chain(descending).collect(),
            ..Self::empty()
        }
    }

    /// Shared settings with no groups; add them with [`ToneConfig::with_group`].
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            octave_count: DEFAULT_OCTAVE_COUNT,
            period: DEFAULT_PERIOD,
            step_interval: DEFAULT_STEP_INTERVAL,
            waveform: Waveform::default(),
            envelope: Envelope::default(),
            master_volume: DEFAULT_MASTER_VOLUME,
            reverb: ReverbConfig::default(),
        }
    }

    pub fn with_group(mut self, group: GroupConfig) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_octave_count(mut self, octave_count: usize) -> Self {
        self.octave_count = octave_count;
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn with_step_interval(mut self, step_interval: f64) -> Self {
        self.step_interval = step_interval;
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_master_volume(mut self, master_volume: f64) -> Self {
        self.master_volume = master_volume;
        self
    }

    pub fn with_reverb(mut self, reverb: ReverbConfig) -> Self {
        self.reverb = reverb;
        self
    }

    /// Sweep curve for one of this config's groups.
    pub fn sweep_for(&self, group: &GroupConfig) -> Result<Sweep> {
        Sweep::new(
            group.base_frequency,
            self.period,
            self.octave_count,
            group.direction,
            self.envelope,
        )
    }

    /// Check every parameter that defines the sweep domain.
    ///
    /// Gains, volumes and reverb amounts are not checked: they are clamped
    /// where they are applied.
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(Error::InvalidConfig("at least one group is required".into()));
        }
        if !(self.step_interval.is_finite() && self.step_interval > 0.0) {
            return Err(Error::InvalidStepInterval(self.step_interval));
        }
        for group in &self.groups {
            self.sweep_for(group)?;
        }
        Ok(())
    }

    /// Parse a TOML document; missing fields fall back to the defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self::shepard(DEFAULT_BASE_FREQUENCY, DEFAULT_COMPONENTS)
    }
}
