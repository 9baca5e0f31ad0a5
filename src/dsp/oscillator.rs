use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Periodic Oscillators
====================

A phase accumulator walks from 0.0 to 1.0 once per cycle. Every waveform is a
pure function of that normalized phase, so changing frequency between samples
only changes the phase increment and never makes the output jump.

    increment = frequency / sample_rate
    phase     = (phase + increment) mod 1.0

Waveforms (all bipolar, -1.0 to +1.0, starting on the rising edge):

  Sine       sin(2π · phase)
  Square     +1 for the first half cycle, -1 for the second
  Triangle   0 → +1 → 0 → -1 → 0 over one cycle
  Sawtooth   linear ramp from -1 to +1, snapping back at the wrap

The Shepard bank uses square waves by default: the odd harmonics of every
component land on other components' octaves, which thickens the illusion.
*/

/// The closed set of periodic waveforms an oscillator can produce.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// Evaluate the waveform at a normalized phase in `[0, 1)`.
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 2.0 * (2.0 * (phase + 0.25).fract() - 1.0).abs(),
            Waveform::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

/// Phase-accumulating oscillator core.
///
/// Frequency is supplied per sample so the caller can sweep it continuously.
#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    /// Produce one sample and advance the phase by one sample period.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let sample = self.waveform.sample(self.phase);
        self.phase = (self.phase + frequency / sample_rate).fract();
        sample
    }

    /// Fill `out` at a fixed frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}
