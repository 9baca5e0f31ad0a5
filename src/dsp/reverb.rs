//! Reverb - Chowning-style delay network used as the effect send.
//!
//! The Shepard bank is a sustained, slowly moving texture, so a long smooth
//! tail suits it better than early reflections. This is the classic
//! JCRev layout: three series allpass diffusers feeding four parallel
//! feedback comb filters.
//!
//! ```text
//! Input ──→ [AP 1] ──→ [AP 2] ──→ [AP 3] ──┬──→ [Comb 1] ──┐
//!                                          ├──→ [Comb 2] ──┤
//!                                          ├──→ [Comb 3] ──┼──→ (+) ──→ Output
//!                                          └──→ [Comb 4] ──┘
//! ```
//!
//! Delay lengths are the original JCRev sample counts at 25 kHz, rescaled to
//! the running sample rate so the room keeps its size at any rate.
//!
//! # Parameters
//!
//! - **Room Size**: comb feedback (longer decay as it grows)
//! - **Damping**: one-pole lowpass inside each comb loop (darker tail)

/// JCRev allpass lengths in samples at [`REFERENCE_RATE`].
const ALLPASS_DELAYS: [f32; 3] = [347.0, 113.0, 37.0];
/// JCRev comb lengths in samples at [`REFERENCE_RATE`].
const COMB_DELAYS: [f32; 4] = [1601.0, 1867.0, 2053.0, 2251.0];
const REFERENCE_RATE: f32 = 25_000.0;
const ALLPASS_GAIN: f32 = 0.7;

/// Comb feedback at room size 0.0.
const MIN_FEEDBACK: f32 = 0.6;
/// Comb feedback at room size 1.0.
const MAX_FEEDBACK: f32 = 0.97;

fn scaled_length(reference: f32, sample_rate: f32) -> usize {
    ((reference * sample_rate / REFERENCE_RATE).round() as usize).max(1)
}

/// Feedback comb with a damping lowpass in the loop.
///
/// The delay line is allocated once at construction.
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: MIN_FEEDBACK,
            damp: 0.0,
            filter_state: 0.0,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, MAX_FEEDBACK);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        self.filter_state = output * (1.0 - self.damp) + self.filter_state * self.damp;
        self.buffer[self.write_pos] = input + self.filter_state * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Schroeder allpass diffuser.
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    gain: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            gain: ALLPASS_GAIN,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];
        let output = -self.gain * input + delayed;

        self.buffer[self.write_pos] = input + self.gain * output;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Fully wet reverb; the caller mixes it against the dry bus.
pub struct Reverb {
    allpasses: [AllpassFilter; 3],
    combs: [CombFilter; 4],
    room_size: f32,
    damping: f32,
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let allpasses = ALLPASS_DELAYS.map(|d| AllpassFilter::new(scaled_length(d, sample_rate)));
        let combs = COMB_DELAYS.map(|d| CombFilter::new(scaled_length(d, sample_rate)));

        let mut reverb = Self {
            allpasses,
            combs,
            room_size: 0.0,
            damping: 0.0,
        };
        reverb.set_room_size(0.5);
        reverb.set_damping(0.2);
        reverb
    }

    /// Room size in `[0, 1]`, clamped.
    pub fn set_room_size(&mut self, size: f32) {
        self.room_size = size.clamp(0.0, 1.0);
        let feedback = MIN_FEEDBACK + self.room_size * (MAX_FEEDBACK - MIN_FEEDBACK);
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    /// High-frequency absorption in `[0, 1]`, clamped.
    pub fn set_damping(&mut self, damp: f32) {
        self.damping = damp.clamp(0.0, 1.0);
        for comb in &mut self.combs {
            comb.set_damp(self.damping);
        }
    }

    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let mut diffused = input;
        for allpass in &mut self.allpasses {
            diffused = allpass.process(diffused);
        }

        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(diffused);
        }
        output * 0.25
    }

    pub fn reset(&mut self) {
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
        for comb in &mut self.combs {
            comb.reset();
        }
    }
}
