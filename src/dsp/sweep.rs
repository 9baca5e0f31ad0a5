//! Shepard sweep math: exponential frequency glide and masking envelope.

/*
The Shepard Sweep
=================

One group holds N oscillators, N = octave count. Each traces the same curve
over one period P, shifted in time by P·i/N:

  phase time      t_i = (T + offset_i) mod P

  frequency       f(t) = f0 · 2^(-d · t / (P/N))
                  d = -1 ascending, +1 descending

  volume          bell curve centred on P/2

    freq (log)                          vol
      │      ╱   ╱   ╱   ╱                │       ╭─╮
      │    ╱   ╱   ╱   ╱                  │      ╱   ╲
      │  ╱   ╱   ╱   ╱                    │    ╱       ╲
      │╱   ╱   ╱   ╱                      │__╱           ╲__
      └──────────────→ T                  └────────────────→ t
        each line climbs N octaves          0      P/2      P

P/N seconds of phase time move pitch by exactly one octave, so neighbours
always sit one octave apart. The wrap from f0·2^N back to f0 happens where
the envelope is (near) zero, so the ear never hears the jump.

Envelope Shape
--------------

The envelope formula reads `a · exp(-(t - c)² / 2 · k²)`. Under normal
precedence that is `exp(-(t - c)² · k² / 2)`, a Gaussian with σ = 1/k, which
with k = 0.2 gives σ = 5 s. The textbook form `exp(-(t - c)² / (2k²))` treats
k itself as σ; with k = 0.2 s the bell is only a fraction of a second wide.
Both are available through `EnvelopeShape`, with `Literal` as the default.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Peak volume of the masking envelope.
pub const ENVELOPE_AMPLITUDE: f64 = 0.5;
/// Width constant `k` of the masking envelope.
pub const ENVELOPE_WIDTH: f64 = 0.2;

/// Sweep direction of a group.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Sign used in the exponent of the frequency curve.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Ascending => -1.0,
            Direction::Descending => 1.0,
        }
    }
}

/// How the bell envelope exponent is evaluated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeShape {
    /// `a · exp(-(t - c)² / 2 · k²)`, evaluated left to right.
    #[default]
    Literal,
    /// `a · exp(-(t - c)² / (2k²))`.
    Gaussian,
}

/// Bell-shaped volume envelope.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub shape: EnvelopeShape,
    pub amplitude: f64,
    pub width: f64,
}

impl Envelope {
    pub fn new(shape: EnvelopeShape, amplitude: f64, width: f64) -> Self {
        Self {
            shape,
            amplitude,
            width,
        }
    }

    pub fn literal() -> Self {
        Self::new(EnvelopeShape::Literal, ENVELOPE_AMPLITUDE, ENVELOPE_WIDTH)
    }

    pub fn gaussian(width: f64) -> Self {
        Self::new(EnvelopeShape::Gaussian, ENVELOPE_AMPLITUDE, width)
    }

    /// Volume at phase time `t` for a bell centred on `center`.
    #[inline]
    pub fn volume(&self, t: f64, center: f64) -> f64 {
        let offset = (t - center).powi(2);
        let exponent = match self.shape {
            EnvelopeShape::Literal => -offset / 2.0 * self.width.powi(2),
            EnvelopeShape::Gaussian => -offset / (2.0 * self.width.powi(2)),
        };
        self.amplitude * exponent.exp()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(Error::InvalidEnvelopeWidth(self.width));
        }
        Ok(())
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::literal()
    }
}

/// `base · 2^(-direction · t / octave_duration)`.
#[inline]
pub fn sweep_frequency(base: f64, t: f64, octave_duration: f64, direction: Direction) -> f64 {
    base * 2.0_f64.powf(-direction.sign() * t / octave_duration)
}

/// Phase time of an oscillator, always in `[0, period)`.
#[inline]
pub fn phase_time(time: f64, phase_offset: f64, period: f64) -> f64 {
    let t = (time + phase_offset).rem_euclid(period);
    // rem_euclid can round up to exactly `period` for tiny negative inputs
    if t >= period {
        0.0
    } else {
        t
    }
}

/// The validated curve shared by every oscillator of one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    base_frequency: f64,
    period: f64,
    octave_count: usize,
    direction: Direction,
    envelope: Envelope,
}

impl Sweep {
    pub fn new(
        base_frequency: f64,
        period: f64,
        octave_count: usize,
        direction: Direction,
        envelope: Envelope,
    ) -> Result<Self> {
        if !(base_frequency.is_finite() && base_frequency > 0.0) {
            return Err(Error::InvalidBaseFrequency(base_frequency));
        }
        if !(period.is_finite() && period > 0.0) {
            return Err(Error::InvalidPeriod(period));
        }
        if octave_count == 0 {
            return Err(Error::InvalidOctaveCount(octave_count));
        }
        envelope.validate()?;

        Ok(Self {
            base_frequency,
            period,
            octave_count,
            direction,
            envelope,
        })
    }

    pub fn base_frequency(&self) -> f64 {
        self.base_frequency
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn octave_count(&self) -> usize {
        self.octave_count
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Phase time over which pitch moves by one octave.
    pub fn octave_duration(&self) -> f64 {
        self.period / self.octave_count as f64
    }

    /// Phase offset of oscillator `index`: `period · index / octave_count`.
    pub fn phase_offset(&self, index: usize) -> f64 {
        self.period * index as f64 / self.octave_count as f64
    }

    pub fn phase_time(&self, time: f64, phase_offset: f64) -> f64 {
        phase_time(time, phase_offset, self.period)
    }

    pub fn frequency_at(&self, t: f64) -> f64 {
        sweep_frequency(self.base_frequency, t, self.octave_duration(), self.direction)
    }

    pub fn volume_at(&self, t: f64) -> f64 {
        self.envelope.volume(t, self.period / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sweep(direction: Direction) -> Sweep {
        Sweep::new(110.0, 50.0, 4, direction, Envelope::literal()).unwrap()
    }

    #[test]
    fn frequency_starts_at_base() {
        for direction in [Direction::Ascending, Direction::Descending] {
            assert_eq!(sweep(direction).frequency_at(0.0), 110.0);
        }
    }

    #[test]
    fn one_octave_duration_is_one_octave() {
        let up = sweep(Direction::Ascending);
        let down = sweep(Direction::Descending);
        let d = up.octave_duration();

        assert_relative_eq!(d, 12.5);
        assert_relative_eq!(up.frequency_at(d), 220.0, max_relative = 1e-12);
        assert_relative_eq!(down.frequency_at(d), 55.0, max_relative = 1e-12);
    }

    #[test]
    fn envelope_peaks_at_center_and_vanishes_at_wrap() {
        let s = sweep(Direction::Ascending);
        assert_eq!(s.volume_at(25.0), ENVELOPE_AMPLITUDE);
        assert!(s.volume_at(0.0) < 1e-5);
        assert!(s.volume_at(50.0) < 1e-5);
        assert_relative_eq!(s.volume_at(0.0), s.volume_at(50.0));
    }

    #[test]
    fn literal_envelope_matches_fixture() {
        // 0.5 * exp(-(t - 25)^2 / 2 * 0.04)
        let env = Envelope::literal();
        assert_relative_eq!(env.volume(20.0, 25.0), 0.5 * (-0.5f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(env.volume(15.0, 25.0), 0.067_667_641_618_306_35, max_relative = 1e-9);
        assert_relative_eq!(env.volume(0.0, 25.0), 1.863_326_586_039_335_5e-6, max_relative = 1e-9);
    }

    #[test]
    fn gaussian_envelope_matches_canonical_fixture() {
        // 0.5 * exp(-(t - c)^2 / (2 * 0.2^2))
        let env = Envelope::gaussian(0.2);
        assert_relative_eq!(env.volume(25.2, 25.0), 0.5 * (-0.5f64).exp(), max_relative = 1e-12);
        assert_eq!(env.volume(25.0, 25.0), 0.5);
        // Far from the centre the canonical form is already silent.
        assert!(env.volume(20.0, 25.0) < 1e-100);
    }

    #[test]
    fn phase_time_wraps_into_period() {
        assert_relative_eq!(phase_time(60.0, 12.5, 50.0), 22.5);
        assert_relative_eq!(phase_time(-5.0, 0.0, 50.0), 45.0);
        assert_eq!(phase_time(50.0, 0.0, 50.0), 0.0);
        assert!(phase_time(-1e-18, 0.0, 50.0) < 50.0);
    }

    #[test]
    fn curves_repeat_every_period() {
        let s = sweep(Direction::Descending);
        for i in 0..100 {
            let time = i as f64 * 0.73;
            let a = s.phase_time(time, s.phase_offset(1));
            let b = s.phase_time(time + s.period(), s.phase_offset(1));
            assert_relative_eq!(s.frequency_at(a), s.frequency_at(b), max_relative = 1e-9);
            assert_relative_eq!(s.volume_at(a), s.volume_at(b), epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_invalid_domain() {
        let env = Envelope::literal();
        assert!(matches!(
            Sweep::new(0.0, 50.0, 4, Direction::Ascending, env),
            Err(Error::InvalidBaseFrequency(_))
        ));
        assert!(matches!(
            Sweep::new(110.0, -1.0, 4, Direction::Ascending, env),
            Err(Error::InvalidPeriod(_))
        ));
        assert!(matches!(
            Sweep::new(110.0, 50.0, 0, Direction::Ascending, env),
            Err(Error::InvalidOctaveCount(0))
        ));
        assert!(matches!(
            Sweep::new(110.0, f64::NAN, 4, Direction::Ascending, env),
            Err(Error::InvalidPeriod(_))
        ));
        assert!(matches!(
            Sweep::new(110.0, 50.0, 4, Direction::Ascending, Envelope::gaussian(0.0)),
            Err(Error::InvalidEnvelopeWidth(_))
        ));
    }
}
