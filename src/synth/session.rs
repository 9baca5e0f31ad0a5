use log::{debug, info, warn};

use crate::{
    config::ToneConfig,
    error::{Error, Result},
    graph::{
        bus::{EffectParam, OutputBus},
        node::{GraphNode, RenderCtx},
    },
    synth::{
        clamp_unit,
        group::OscillatorGroup,
        message::{MessageReceiver, ToneMessage},
        snapshot::Snapshot,
    },
    MAX_BLOCK_SIZE,
};

/// Seconds the master volume takes to rise after a start.
pub const FADE_IN_SECONDS: f64 = 2.0;
/// Seconds a running master or effect change takes to settle.
pub const PARAMETER_RAMP_SECONDS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
}

/// Owns every group and the output bus.
///
/// A session does nothing on its own: the caller drives it with
/// [`ToneSession::step`] once per step interval and pulls audio with
/// [`ToneSession::render`]. All times are audio-clock seconds.
pub struct ToneSession {
    groups: Vec<OscillatorGroup>,
    bus: OutputBus,
    state: SessionState,
    step_interval: f64,
    sample_rate: f32,
    master_volume: f64,
    effects: [f64; 3],
    pending_fade_in: bool,
    snapshot: Snapshot,
    scratch: Vec<f32>,
}

impl ToneSession {
    pub fn new(config: &ToneConfig, sample_rate: f32) -> Result<Self> {
        config.validate()?;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let master_volume = clamp_unit("Master volume", config.master_volume);
        let bus = OutputBus::new(sample_rate, master_volume, &config.reverb);
        let routing = bus.destinations();

        let groups = config
            .groups
            .iter()
            .map(|group| {
                let sweep = config.sweep_for(group)?;
                let mut group = OscillatorGroup::new(sweep, config.waveform, group.gain);
                group.chain(&routing);
                Ok(group)
            })
            .collect::<Result<Vec<_>>>()?;

        let effects = EffectParam::ALL.map(|param| bus.effect_at(param, 0.0));
        let snapshot = Snapshot::with_layout(groups.iter().map(OscillatorGroup::len));

        info!(
            "Tone session ready: {} groups x {} oscillators, period {}s, step {}s",
            groups.len(),
            config.octave_count,
            config.period,
            config.step_interval
        );

        Ok(Self {
            groups,
            bus,
            state: SessionState::Idle,
            step_interval: config.step_interval,
            sample_rate,
            master_volume,
            effects,
            pending_fade_in: false,
            snapshot,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn step_interval(&self) -> f64 {
        self.step_interval
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn groups(&self) -> &[OscillatorGroup] {
        &self.groups
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn bus(&self) -> &OutputBus {
        &self.bus
    }

    /// Configured master volume; the fade-in and ramps head towards it.
    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    /// Configured value of an effect parameter.
    pub fn effect_parameter(&self, param: EffectParam) -> f64 {
        self.effects[param as usize]
    }

    /// Snapshot produced by the most recent step.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Idle to Running. The master gain drops to zero and the next step
    /// fades it in over [`FADE_IN_SECONDS`]. Does nothing while running.
    pub fn start(&mut self, now: f64) {
        if self.is_running() {
            return;
        }

        self.bus.set_master(now, 0.0);
        for (param, value) in EffectParam::ALL.into_iter().zip(self.effects) {
            self.bus.set_effect(now, param, value);
        }
        for group in &mut self.groups {
            group.start(now);
        }
        self.pending_fade_in = true;
        self.state = SessionState::Running;
        info!("Tone session started at {now:.3}s");
    }

    /// Running to Idle. Oscillators hold their last values; the reverb tail
    /// keeps ringing. Does nothing while idle.
    pub fn stop(&mut self, now: f64) {
        if !self.is_running() {
            return;
        }

        for group in &mut self.groups {
            group.stop(now);
        }
        self.pending_fade_in = false;
        self.state = SessionState::Idle;
        info!("Tone session stopped at {now:.3}s");
    }

    /// Advance every group towards the curve values at `time`.
    ///
    /// `now` is the current audio-clock position and `time` the target the
    /// ramps arrive at. Returns `None` while idle.
    pub fn step(&mut self, now: f64, time: f64) -> Option<&Snapshot> {
        if !self.is_running() {
            return None;
        }

        if self.pending_fade_in {
            self.pending_fade_in = false;
            self.bus
                .ramp_master(now, self.master_volume, now + FADE_IN_SECONDS);
        }

        self.snapshot.time = time;
        for (group, values) in self.groups.iter_mut().zip(self.snapshot.groups.iter_mut()) {
            let gain = group.gain();
            values.clear();
            values.extend(group.step(now, time).iter().map(|value| {
                let mut value = *value;
                value.volume *= gain;
                value
            }));
        }

        Some(&self.snapshot)
    }

    /// Set a group's mix gain, clamped to `[0, 1]`. Applies from the next
    /// step whether or not the session is running.
    pub fn set_group_gain(&mut self, index: usize, gain: f64) -> Result<()> {
        let count = self.groups.len();
        let group = self
            .groups
            .get_mut(index)
            .ok_or(Error::GroupOutOfRange { index, count })?;
        group.set_gain(gain);
        debug!("Group {index} gain set to {}", group.gain());
        Ok(())
    }

    /// Set the master volume, clamped to `[0, 1]`.
    ///
    /// While running the bus ramps there over [`PARAMETER_RAMP_SECONDS`];
    /// while idle the value is stored and reached by the next fade-in.
    pub fn set_master_volume(&mut self, now: f64, volume: f64) {
        self.master_volume = clamp_unit("Master volume", volume);
        if self.is_running() && !self.pending_fade_in {
            self.bus
                .ramp_master(now, self.master_volume, now + PARAMETER_RAMP_SECONDS);
        }
        debug!("Master volume set to {}", self.master_volume);
    }

    /// Set a reverb parameter, clamped to `[0, 1]`. Same running/idle rule as
    /// [`ToneSession::set_master_volume`]; idle values apply at the next start.
    pub fn set_effect_parameter(&mut self, now: f64, param: EffectParam, value: f64) {
        let value = clamp_unit(param.name(), value);
        self.effects[param as usize] = value;
        if self.is_running() {
            self.bus
                .ramp_effect(now, param, value, now + PARAMETER_RAMP_SECONDS);
        }
        debug!("Effect {} set to {value}", param.name());
    }

    /// Apply one control message at `now`.
    pub fn apply(&mut self, now: f64, message: ToneMessage) -> Result<()> {
        match message {
            ToneMessage::Start => self.start(now),
            ToneMessage::Stop => self.stop(now),
            ToneMessage::SetGroupGain { index, gain } => self.set_group_gain(index, gain)?,
            ToneMessage::SetMasterVolume(volume) => self.set_master_volume(now, volume),
            ToneMessage::SetEffectParameter { param, value } => {
                self.set_effect_parameter(now, param, value)
            }
        }
        Ok(())
    }

    /// Apply every pending message; rejected ones are logged and skipped.
    pub fn drain<R: MessageReceiver>(&mut self, now: f64, rx: &mut R) {
        while let Some(message) = rx.pop() {
            if let Err(err) = self.apply(now, message) {
                warn!("Dropped control message {message:?}: {err}");
            }
        }
    }

    /// Render `out` starting at audio-clock `start_time`. Silent while idle
    /// apart from the decaying reverb tail.
    ///
    /// `sample_rate` should match the rate the session was built for; the
    /// reverb delay lines are sized for that one.
    pub fn render(&mut self, out: &mut [f32], start_time: f64, sample_rate: f32) {
        self.render_block(out, &RenderCtx::new(sample_rate, start_time));
    }

    fn render_chunk(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frames = out.len();
        self.bus.clear(frames);

        if self.is_running() {
            let scratch = &mut self.scratch[..frames];
            for group in &mut self.groups {
                group.render_block(scratch, ctx);
                for &destination in group.destinations() {
                    self.bus.accumulate(destination, scratch);
                }
            }
        }

        self.bus.mix_down(out, ctx);
    }
}

impl GraphNode for ToneSession {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, chunk) in out.chunks_mut(MAX_BLOCK_SIZE).enumerate() {
            let chunk_ctx = ctx.advanced(i * MAX_BLOCK_SIZE);
            self.render_chunk(chunk, &chunk_ctx);
        }
    }

    fn is_active(&self) -> bool {
        self.is_running()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::{config::GroupConfig, dsp::sweep::Direction};
    use approx::assert_relative_eq;

    fn session() -> ToneSession {
        let config = ToneConfig::empty()
            .with_octave_count(4)
            .with_period(50.0)
            .with_group(GroupConfig::new(110.0, Direction::Ascending, 1.0))
            .with_group(GroupConfig::new(110.0, Direction::Descending, 1.0));
        ToneSession::new(&config, 48_000.0).unwrap()
    }

    #[test]
    fn rejects_bad_sample_rate() {
        let config = ToneConfig::default();
        assert!(matches!(
            ToneSession::new(&config, 0.0),
            Err(Error::InvalidSampleRate(_))
        ));
    }

    #[test]
    fn groups_feed_both_bus_inputs() {
        let session = session();
        for group in session.groups() {
            assert_eq!(group.destinations(), &session.bus().destinations());
        }
    }

    #[test]
    fn idle_session_does_not_step() {
        let mut session = session();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.step(0.0, 0.1).is_none());
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut session = session();
        session.start(0.0);
        session.start(0.5);
        assert!(session.is_running());

        session.stop(1.0);
        session.stop(1.5);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.groups().iter().all(|g| !g.is_running()));
    }

    #[test]
    fn first_step_fades_master_in() {
        let mut session = session();
        session.start(0.0);
        assert_eq!(session.bus().master_at(0.0), 0.0);

        session.step(0.0, 0.1);
        let bus = session.bus();
        assert_relative_eq!(bus.master_at(1.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(bus.master_at(FADE_IN_SECONDS), 0.5, epsilon = 1e-12);

        // later steps leave the fade alone
        session.step(0.1, 0.2);
        assert_relative_eq!(session.bus().master_at(1.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn snapshot_includes_group_gain() {
        let mut session = session();
        session.start(0.0);
        session.set_group_gain(1, 0.0).unwrap();

        let snapshot = session.step(0.0, 25.0).unwrap().clone();
        assert_eq!(snapshot.time, 25.0);
        assert_eq!(snapshot.groups.len(), 2);
        assert!(snapshot.groups[0].iter().any(|v| v.volume > 0.0));
        assert!(snapshot.groups[1].iter().all(|v| v.volume == 0.0));
        // frequencies are unaffected by gain
        assert_relative_eq!(snapshot.groups[1][0].frequency, 110.0 / 4.0, epsilon = 1e-9);
    }

    #[test]
    fn unknown_group_is_an_error() {
        let mut session = session();
        assert!(matches!(
            session.set_group_gain(2, 0.5),
            Err(Error::GroupOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn idle_master_volume_is_reached_by_fade_in() {
        let mut session = session();
        session.set_master_volume(0.0, 0.8);
        assert_eq!(session.bus().master_at(0.0), 0.5);

        session.start(1.0);
        session.step(1.0, 1.1);
        assert_relative_eq!(
            session.bus().master_at(1.0 + FADE_IN_SECONDS),
            0.8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn running_changes_ramp() {
        let mut session = session();
        session.start(0.0);
        session.step(0.0, 0.1);
        session.set_master_volume(5.0, 2.0);
        assert_eq!(session.master_volume(), 1.0);
        assert_relative_eq!(
            session.bus().master_at(5.0 + PARAMETER_RAMP_SECONDS / 2.0),
            0.75,
            epsilon = 1e-12
        );

        session.set_effect_parameter(5.0, EffectParam::Wet, 0.0);
        assert_eq!(session.effect_parameter(EffectParam::Wet), 0.0);
        assert_eq!(
            session.bus().effect_at(EffectParam::Wet, 5.0 + PARAMETER_RAMP_SECONDS),
            0.0
        );
    }

    #[test]
    fn idle_effect_changes_wait_for_start() {
        let mut session = session();
        let before = session.bus().effect_at(EffectParam::RoomSize, 1.0);
        session.set_effect_parameter(0.0, EffectParam::RoomSize, 0.9);
        assert_eq!(session.bus().effect_at(EffectParam::RoomSize, 1.0), before);

        session.start(2.0);
        assert_eq!(session.bus().effect_at(EffectParam::RoomSize, 2.0), 0.9);
    }

    #[test]
    fn drain_applies_messages_in_order() {
        let mut session = session();
        let mut queue = VecDeque::from([
            ToneMessage::Start,
            ToneMessage::SetGroupGain { index: 9, gain: 0.1 },
            ToneMessage::SetGroupGain { index: 0, gain: 0.3 },
        ]);
        session.drain(0.0, &mut queue);

        assert!(queue.is_empty());
        assert!(session.is_running());
        assert_eq!(session.groups()[0].gain(), 0.3);
    }

    #[test]
    fn idle_render_is_silent() {
        let mut session = session();
        let mut out = vec![1.0f32; MAX_BLOCK_SIZE + 100];
        session.render(&mut out, 0.0, 48_000.0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn running_render_makes_sound() {
        let config = ToneConfig::empty()
            .with_octave_count(4)
            .with_period(50.0)
            .with_master_volume(1.0)
            .with_group(GroupConfig::new(220.0, Direction::Ascending, 1.0));
        let mut session = ToneSession::new(&config, 48_000.0).unwrap();
        session.start(0.0);
        session.step(0.0, 0.1);

        let mut out = vec![0.0f32; 4_800];
        session.render(&mut out, 1.0, 48_000.0);
        assert!(out.iter().any(|&s| s.abs() > 0.01));
        assert!(out.iter().all(|&s| s.abs() <= 1.0));
    }
}
