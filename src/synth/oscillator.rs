use crate::{
    dsp::{
        oscillator::{OscillatorBlock, Waveform},
        ramp::LinearRamp,
    },
    graph::node::{GraphNode, RenderCtx},
};

/// One tone generator of a group.
///
/// Frequency and gain are plain owned ramps on the audio clock; the only way
/// to change them is [`Oscillator::ramp_to_values`]. Inputs are not checked
/// here, the owning group clamps them first.
#[derive(Debug, Clone)]
pub struct Oscillator {
    phase_offset: f64,
    block: OscillatorBlock,
    frequency: LinearRamp,
    gain: LinearRamp,
    running: bool,
}

impl Oscillator {
    pub fn new(phase_offset: f64, waveform: Waveform, frequency: f64, gain: f64) -> Self {
        Self {
            phase_offset,
            block: OscillatorBlock::new(waveform),
            frequency: LinearRamp::new(frequency),
            gain: LinearRamp::new(gain),
            running: false,
        }
    }

    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    pub fn waveform(&self) -> Waveform {
        self.block.waveform()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start producing sound at the current frequency and gain.
    pub fn start(&mut self, _now: f64) {
        self.running = true;
    }

    /// Silence immediately.
    ///
    /// Any ramp in flight is frozen at its value at `now`, so a later start
    /// resumes from there. Stopping a stopped oscillator does nothing.
    pub fn stop(&mut self, now: f64) {
        if !self.running {
            return;
        }
        self.running = false;
        self.frequency.cancel(now);
        self.gain.cancel(now);
        self.block.reset();
    }

    /// Ramp frequency and gain linearly from their values at `now`, arriving
    /// at `target_time`. A target time at or before `now` snaps instead.
    pub fn ramp_to_values(&mut self, now: f64, target_time: f64, frequency: f64, gain: f64) {
        self.frequency.ramp_to(now, frequency, target_time);
        self.gain.ramp_to(now, gain, target_time);
    }

    pub fn frequency_at(&self, time: f64) -> f64 {
        self.frequency.value_at(time)
    }

    pub fn gain_at(&self, time: f64) -> f64 {
        self.gain.value_at(time)
    }

    /// One sample at audio-clock `time`; zero while stopped.
    #[inline]
    pub fn next_sample(&mut self, time: f64, sample_rate: f32) -> f32 {
        if !self.running {
            return 0.0;
        }
        let frequency = self.frequency.value_at(time) as f32;
        let gain = self.gain.value_at(time) as f32;
        self.block.next_sample(frequency, sample_rate) * gain
    }
}

impl GraphNode for Oscillator {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.next_sample(ctx.sample_time(i), ctx.sample_rate);
        }
    }

    fn is_active(&self) -> bool {
        self.running
    }
}
