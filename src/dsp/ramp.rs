//! Time-addressed linear parameter ramps.
//!
//! A [`LinearRamp`] holds one straight segment `(start_time, start_value) →
//! (end_time, end_value)` on the audio clock. Reading it at any time returns
//! the interpolated value, clamped to the segment ends. Scheduling a new ramp
//! always starts from the value interpolated at the moment of the request, so
//! back-to-back requests chain without a jump and without overshoot:
//!
//! ```text
//!  value
//!    │        first target ·
//!    │              ╱ ·
//!    │            ╱·   second request at `now`
//!    │          ╱  ╲
//!    │        ╱      ╲______ second target
//!    └──────────────────────→ time
//! ```
//!
//! # Example
//!
//! ```
//! use shepard_dsp::dsp::ramp::LinearRamp;
//!
//! let mut gain = LinearRamp::new(0.0);
//! gain.ramp_to(0.0, 1.0, 2.0);
//! assert!((gain.value_at(1.0) - 0.5).abs() < 1e-12);
//! ```

/// One linear segment on the audio clock (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    start_time: f64,
    start_value: f64,
    end_time: f64,
    end_value: f64,
}

impl LinearRamp {
    /// A ramp resting at `value` since the beginning of time.
    pub fn new(value: f64) -> Self {
        Self {
            start_time: 0.0,
            start_value: value,
            end_time: 0.0,
            end_value: value,
        }
    }

    /// Interpolated value at `time`.
    #[inline]
    pub fn value_at(&self, time: f64) -> f64 {
        if time >= self.end_time {
            self.end_value
        } else if time <= self.start_time {
            self.start_value
        } else {
            let progress = (time - self.start_time) / (self.end_time - self.start_time);
            self.start_value + (self.end_value - self.start_value) * progress
        }
    }

    /// Ramp from the value interpolated at `now` to `target`, arriving at
    /// `end_time`. A target time at or before `now` sets the value immediately.
    pub fn ramp_to(&mut self, now: f64, target: f64, end_time: f64) {
        if end_time <= now {
            self.set_immediate(now, target);
            return;
        }

        self.start_value = self.value_at(now);
        self.start_time = now;
        self.end_value = target;
        self.end_time = end_time;
    }

    /// Jump to `value` at `now`, discarding any scheduled segment.
    pub fn set_immediate(&mut self, now: f64, value: f64) {
        self.start_time = now;
        self.start_value = value;
        self.end_time = now;
        self.end_value = value;
    }

    /// Abandon the in-flight segment, holding the value reached at `now`.
    pub fn cancel(&mut self, now: f64) -> f64 {
        let held = self.value_at(now);
        self.set_immediate(now, held);
        held
    }

    /// Value the current segment ends on.
    pub fn target(&self) -> f64 {
        self.end_value
    }

    /// Time the current segment ends at.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn is_ramping(&self, now: f64) -> bool {
        now < self.end_time && self.start_value != self.end_value
    }
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}
