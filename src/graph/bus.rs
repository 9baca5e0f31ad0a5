use std::str::FromStr;

use crate::{
    config::ReverbConfig,
    dsp::{ramp::LinearRamp, reverb::Reverb},
    error::{Error, Result},
    graph::node::RenderCtx,
    MAX_BLOCK_SIZE,
};

/*
Output Bus
==========

Every group renders into one or both of two shared buses owned by the
session. Nothing is looked up globally: the session builds one `OutputBus`
and hands its `Destination` handles to each group when chaining.

  group ─┬─→ Mix ─────────────→ × master ──────────────→ (1 - wet) ─┐
         │                                                          (+) ─→ out
         └─→ EffectSend ──────→ × master ─→ [Reverb] ───→ wet ──────┘

Master volume sits before the reverb, so fading the master also fades what
is fed into the tail; the tail itself rings out naturally after a stop.

All four parameters (master, room size, damping, wet) are `LinearRamp`s on
the audio clock. Master and wet are read per sample; room size and damping
once per block since they only retune the comb feedback.
*/

/// Handle for one of the bus inputs a group can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Dry mix bus.
    Mix,
    /// Reverb send.
    EffectSend,
}

/// Effect parameters adjustable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectParam {
    /// Reverb room size (0.0 = small, 1.0 = large)
    RoomSize,
    /// High-frequency damping (0.0 = bright, 1.0 = dark)
    Damping,
    /// Crossfade between mix bus and reverb (0.0 = dry, 1.0 = wet)
    Wet,
}

impl EffectParam {
    pub const ALL: [EffectParam; 3] = [EffectParam::RoomSize, EffectParam::Damping, EffectParam::Wet];

    pub fn name(self) -> &'static str {
        match self {
            EffectParam::RoomSize => "room_size",
            EffectParam::Damping => "damping",
            EffectParam::Wet => "wet",
        }
    }
}

impl FromStr for EffectParam {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "room_size" | "roomSize" | "reverb" => Ok(EffectParam::RoomSize),
            "damping" => Ok(EffectParam::Damping),
            "wet" => Ok(EffectParam::Wet),
            other => Err(Error::UnknownParameter(other.to_owned())),
        }
    }
}

/// Shared mix bus, reverb send and master gain stage.
pub struct OutputBus {
    master: LinearRamp,
    room_size: LinearRamp,
    damping: LinearRamp,
    wet: LinearRamp,
    reverb: Reverb,
    mix: Vec<f32>,
    send: Vec<f32>,
}

impl OutputBus {
    pub fn new(sample_rate: f32, master_volume: f64, reverb: &ReverbConfig) -> Self {
        let mut bus = Self {
            master: LinearRamp::new(master_volume.clamp(0.0, 1.0)),
            room_size: LinearRamp::new(reverb.room_size.clamp(0.0, 1.0)),
            damping: LinearRamp::new(reverb.damping.clamp(0.0, 1.0)),
            wet: LinearRamp::new(reverb.wet.clamp(0.0, 1.0)),
            reverb: Reverb::new(sample_rate),
            mix: vec![0.0; MAX_BLOCK_SIZE],
            send: vec![0.0; MAX_BLOCK_SIZE],
        };
        bus.retune_reverb(0.0);
        bus
    }

    /// Both input handles, in the order groups are chained by default.
    pub fn destinations(&self) -> [Destination; 2] {
        [Destination::Mix, Destination::EffectSend]
    }

    /// Zero the first `frames` samples of both inputs.
    pub fn clear(&mut self, frames: usize) {
        self.mix[..frames].fill(0.0);
        self.send[..frames].fill(0.0);
    }

    /// Add a rendered group block into `destination`.
    pub fn accumulate(&mut self, destination: Destination, block: &[f32]) {
        let input = match destination {
            Destination::Mix => &mut self.mix,
            Destination::EffectSend => &mut self.send,
        };
        for (acc, &sample) in input.iter_mut().zip(block) {
            *acc += sample;
        }
    }

    /// Apply master gain and reverb to the accumulated inputs, writing `out`.
    ///
    /// `out` must not be longer than [`MAX_BLOCK_SIZE`].
    pub fn mix_down(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        debug_assert!(out.len() <= MAX_BLOCK_SIZE);
        self.retune_reverb(ctx.time);

        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.sample_time(i);
            let master = self.master.value_at(t) as f32;
            let wet = self.wet.value_at(t) as f32;

            let dry = self.mix[i] * master;
            let tail = self.reverb.process(self.send[i] * master);
            *sample = (dry * (1.0 - wet) + tail * wet).clamp(-1.0, 1.0);
        }
    }

    pub fn master_at(&self, time: f64) -> f64 {
        self.master.value_at(time)
    }

    pub fn ramp_master(&mut self, now: f64, target: f64, end_time: f64) {
        self.master.ramp_to(now, target, end_time);
    }

    pub fn set_master(&mut self, now: f64, value: f64) {
        self.master.set_immediate(now, value);
    }

    pub fn effect_at(&self, param: EffectParam, time: f64) -> f64 {
        self.effect(param).value_at(time)
    }

    pub fn ramp_effect(&mut self, now: f64, param: EffectParam, target: f64, end_time: f64) {
        self.effect_mut(param).ramp_to(now, target, end_time);
    }

    pub fn set_effect(&mut self, now: f64, param: EffectParam, value: f64) {
        self.effect_mut(param).set_immediate(now, value);
    }

    fn effect(&self, param: EffectParam) -> &LinearRamp {
        match param {
            EffectParam::RoomSize => &self.room_size,
            EffectParam::Damping => &self.damping,
            EffectParam::Wet => &self.wet,
        }
    }

    fn effect_mut(&mut self, param: EffectParam) -> &mut LinearRamp {
        match param {
            EffectParam::RoomSize => &mut self.room_size,
            EffectParam::Damping => &mut self.damping,
            EffectParam::Wet => &mut self.wet,
        }
    }

    fn retune_reverb(&mut self, time: f64) {
        self.reverb.set_room_size(self.room_size.value_at(time) as f32);
        self.reverb.set_damping(self.damping.value_at(time) as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dry_bus(master: f64) -> OutputBus {
        let reverb = ReverbConfig {
            wet: 0.0,
            ..ReverbConfig::default()
        };
        OutputBus::new(48_000.0, master, &reverb)
    }

    #[test]
    fn parses_effect_names() {
        assert_eq!("room_size".parse::<EffectParam>().unwrap(), EffectParam::RoomSize);
        assert_eq!("wet".parse::<EffectParam>().unwrap(), EffectParam::Wet);
        for param in EffectParam::ALL {
            assert_eq!(param.name().parse::<EffectParam>().unwrap(), param);
        }
        assert!(matches!(
            "chorus".parse::<EffectParam>(),
            Err(Error::UnknownParameter(name)) if name == "chorus"
        ));
    }

    #[test]
    fn dry_mix_is_scaled_by_master() {
        let mut bus = dry_bus(0.5);
        let ctx = RenderCtx::new(48_000.0, 0.0);

        bus.clear(4);
        bus.accumulate(Destination::Mix, &[0.2, 0.4, -0.2, 0.0]);
        bus.accumulate(Destination::Mix, &[0.2, 0.0, 0.0, 0.0]);

        let mut out = [0.0f32; 4];
        bus.mix_down(&mut out, &ctx);
        assert!((out[0] - 0.2).abs() < 1e-6);
        assert!((out[1] - 0.2).abs() < 1e-6);
        assert!((out[2] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn output_is_clamped() {
        let mut bus = dry_bus(1.0);
        bus.clear(2);
        bus.accumulate(Destination::Mix, &[3.0, -3.0]);

        let mut out = [0.0f32; 2];
        bus.mix_down(&mut out, &RenderCtx::new(48_000.0, 0.0));
        assert_eq!(out, [1.0, -1.0]);
    }

    #[test]
    fn master_ramp_is_sampled_per_sample() {
        let mut bus = dry_bus(0.0);
        bus.ramp_master(0.0, 1.0, 1.0);
        assert!((bus.master_at(0.25) - 0.25).abs() < 1e-12);

        let ctx = RenderCtx::new(4.0, 0.0);
        bus.clear(4);
        bus.accumulate(Destination::Mix, &[1.0; 4]);
        let mut out = [0.0f32; 4];
        bus.mix_down(&mut out, &ctx);
        assert_eq!(out[0], 0.0);
        assert!((out[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn effect_parameters_ramp_independently() {
        let mut bus = dry_bus(1.0);
        bus.ramp_effect(0.0, EffectParam::RoomSize, 1.0, 2.0);
        bus.set_effect(0.0, EffectParam::Damping, 0.9);

        assert!(bus.effect_at(EffectParam::RoomSize, 1.0) > 0.5);
        assert_eq!(bus.effect_at(EffectParam::Damping, 1.0), 0.9);
        assert_eq!(bus.effect_at(EffectParam::Wet, 1.0), 0.0);
    }
}
