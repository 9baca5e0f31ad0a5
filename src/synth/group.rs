use crate::{
    dsp::{oscillator::Waveform, sweep::Sweep},
    graph::{
        bus::Destination,
        node::{GraphNode, RenderCtx},
    },
    synth::{clamp_unit, oscillator::Oscillator, snapshot::ToneValue},
    MIN_FREQUENCY,
};

/*
Oscillator Group
================

`octave_count` oscillators share one sweep curve. Oscillator `i` reads the
curve `period · i / octave_count` seconds ahead of the others, so at any
moment the bank covers every octave of the sweep exactly once:

  phase time   0 ─────────────── period/2 ─────────────── period
  volume       ·           ·  ·  ▲  ·  ·           ·
  osc 0        ●
  osc 1                  ●
  osc 2                                 ●
  osc 3                                                ●

As phase time wraps, an oscillator drops from the top of the sweep back to
the bottom, but the envelope has already faded it out at both edges.
*/

/// A fixed set of oscillators evenly spread across one sweep period.
#[derive(Debug, Clone)]
pub struct OscillatorGroup {
    sweep: Sweep,
    oscillators: Vec<Oscillator>,
    gain: f64,
    destinations: Vec<Destination>,
    targets: Vec<ToneValue>,
}

impl OscillatorGroup {
    /// Build the bank, each oscillator resting at the curve value of its own
    /// phase offset scaled by the group gain. The gain is clamped to `[0, 1]`.
    pub fn new(sweep: Sweep, waveform: Waveform, gain: f64) -> Self {
        let gain = clamp_unit("Group gain", gain);
        let oscillators: Vec<Oscillator> = (0..sweep.octave_count())
            .map(|i| {
                let offset = sweep.phase_offset(i);
                let value = target_at(&sweep, sweep.phase_time(0.0, offset));
                Oscillator::new(offset, waveform, value.frequency, value.volume * gain)
            })
            .collect();
        let targets = vec![ToneValue::default(); oscillators.len()];

        Self {
            sweep,
            oscillators,
            gain,
            destinations: Vec::new(),
            targets,
        }
    }

    /// Ramp every oscillator towards the curve value at `time`, arriving at
    /// `time`. The group gain rides on the volume ramp. Returns the targets
    /// in oscillator order, before group gain.
    pub fn step(&mut self, now: f64, time: f64) -> &[ToneValue] {
        for (osc, target) in self.oscillators.iter_mut().zip(self.targets.iter_mut()) {
            let t = self.sweep.phase_time(time, osc.phase_offset());
            *target = target_at(&self.sweep, t);
            osc.ramp_to_values(now, time, target.frequency, target.volume * self.gain);
        }
        &self.targets
    }

    /// Targets computed by the most recent step.
    pub fn targets(&self) -> &[ToneValue] {
        &self.targets
    }

    /// Route this group's output to `destinations`. Replaces any earlier
    /// routing; an empty slice leaves the group unrouted.
    pub fn chain(&mut self, destinations: &[Destination]) {
        self.destinations.clear();
        self.destinations.extend_from_slice(destinations);
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    pub fn start(&mut self, now: f64) {
        for osc in &mut self.oscillators {
            osc.start(now);
        }
    }

    pub fn stop(&mut self, now: f64) {
        for osc in &mut self.oscillators {
            osc.stop(now);
        }
    }

    pub fn is_running(&self) -> bool {
        self.oscillators.iter().any(Oscillator::is_running)
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Set the mix gain, clamped to `[0, 1]`. The oscillators glide to it
    /// over the next step.
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = clamp_unit("Group gain", gain);
    }

    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    /// Sum of all oscillators at `start_time`.
    pub fn render(&mut self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        self.render_block(out, &RenderCtx::new(sample_rate, start_time));
    }
}

impl GraphNode for OscillatorGroup {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let time = ctx.sample_time(i);
            *sample = self
                .oscillators
                .iter_mut()
                .map(|osc| osc.next_sample(time, ctx.sample_rate))
                .sum();
        }
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

fn target_at(sweep: &Sweep, t: f64) -> ToneValue {
    ToneValue {
        frequency: sweep.frequency_at(t).max(MIN_FREQUENCY),
        volume: sweep.volume_at(t).clamp(0.0, 1.0),
    }
}
