//! Error types for shepard_dsp.
//!
//! Construction parameters that define the sweep math are rejected here.
//! Continuously adjustable controls (gains, volumes, effect amounts) are
//! clamped by their setters instead and never produce an error.

use thiserror::Error;

/// Error type for engine construction and control.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid base frequency: {0}. Must be finite and above 0 Hz")]
    InvalidBaseFrequency(f64),

    #[error("Invalid period: {0}. Must be finite and above 0 seconds")]
    InvalidPeriod(f64),

    #[error("Invalid octave count: {0}. Must be at least 1")]
    InvalidOctaveCount(usize),

    #[error("Invalid step interval: {0}. Must be finite and above 0 seconds")]
    InvalidStepInterval(f64),

    #[error("Invalid envelope width: {0}. Must be finite and above 0")]
    InvalidEnvelopeWidth(f64),

    #[error("Invalid sample rate: {0}. Must be finite and above 0 Hz")]
    InvalidSampleRate(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Group index {index} out of range ({count} groups)")]
    GroupOutOfRange { index: usize, count: usize },

    #[error("Unknown effect parameter: {0}")]
    UnknownParameter(String),

    #[error("Control queue full, message dropped")]
    ControlQueueFull,

    #[cfg(feature = "serde")]
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
