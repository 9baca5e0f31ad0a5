//! Audio-thread engine.
//!
//! [`ShepardEngine`] lives in the audio callback. It is paired with a
//! [`ToneHandle`] for the control thread and a [`SnapshotReceiver`] for
//! whoever visualizes the tone, both connected by `rtrb` rings:
//!
//! ```text
//!  control thread ── ToneHandle ──[ToneMessage ring]──→ ShepardEngine ──→ audio out
//!                                                           │
//!  visualizer ←── SnapshotReceiver ←──[Snapshot ring]───────┤
//!                        │                                  │
//!                        └──────────[return ring]───────────┘
//! ```
//!
//! Messages are drained at the top of each block and steps fire on the exact
//! sample they fall on. Snapshots are copied into buffers taken from the
//! return ring, which starts with [`SNAPSHOT_QUEUE_SIZE`] preallocated ones;
//! the engine only allocates when the receiver keeps every buffer. A full
//! snapshot ring drops the new snapshot.

pub mod clock;
pub mod handle;

use log::{info, warn};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

pub use self::{
    clock::StepClock,
    handle::{SnapshotReceiver, ToneHandle},
};
use crate::{
    config::ToneConfig,
    error::{Error, Result},
    graph::node::{GraphNode, RenderCtx},
    synth::{
        group::OscillatorGroup, message::ToneMessage, session::ToneSession, snapshot::Snapshot,
    },
    MAX_BLOCK_SIZE,
};

pub const CONTROL_QUEUE_SIZE: usize = 256;
pub const SNAPSHOT_QUEUE_SIZE: usize = 64;
/// Room for every preallocated snapshot plus the ones allocated on demand.
pub const RECYCLE_QUEUE_SIZE: usize = 2 * SNAPSHOT_QUEUE_SIZE;

pub struct ShepardEngine {
    session: ToneSession,
    clock: StepClock,
    rx: Consumer<ToneMessage>,
    snapshots: Producer<Snapshot>,
    recycled: Consumer<Snapshot>,
    /// Filled snapshot that did not fit the ring, reused by the next step.
    spare: Option<Snapshot>,
    dropped_snapshots: u64,
    mono: Vec<f32>,
}

impl ShepardEngine {
    /// Build the engine and its two control-side ends.
    ///
    /// Fails like [`ToneSession::new`], and with
    /// [`Error::InvalidStepInterval`] when a step would be shorter than one
    /// sample at `sample_rate`.
    pub fn new(
        config: &ToneConfig,
        sample_rate: f32,
    ) -> Result<(Self, ToneHandle, SnapshotReceiver)> {
        let session = ToneSession::new(config, sample_rate)?;
        let frames_per_step = session.step_interval() * sample_rate as f64;
        if frames_per_step < 1.0 {
            return Err(Error::InvalidStepInterval(session.step_interval()));
        }
        let clock = StepClock::new(sample_rate, session.step_interval());

        let (control_tx, control_rx) = RingBuffer::<ToneMessage>::new(CONTROL_QUEUE_SIZE);
        let (snapshot_tx, snapshot_rx) = RingBuffer::<Snapshot>::new(SNAPSHOT_QUEUE_SIZE);
        let (mut recycle_tx, recycle_rx) = RingBuffer::<Snapshot>::new(RECYCLE_QUEUE_SIZE);

        let layout: Vec<usize> = session.groups().iter().map(OscillatorGroup::len).collect();
        for _ in 0..SNAPSHOT_QUEUE_SIZE {
            let _ = recycle_tx.push(Snapshot::with_layout(layout.iter().copied()));
        }

        let handle = ToneHandle::new(control_tx, session.group_count());
        let receiver = SnapshotReceiver::new(snapshot_rx, recycle_tx);

        info!("Shepard engine created at {sample_rate} Hz");

        let engine = Self {
            session,
            clock,
            rx: control_rx,
            snapshots: snapshot_tx,
            recycled: recycle_rx,
            spare: None,
            dropped_snapshots: 0,
            mono: vec![0.0; MAX_BLOCK_SIZE],
        };
        Ok((engine, handle, receiver))
    }

    /// Audio-clock position in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn session(&self) -> &ToneSession {
        &self.session
    }

    pub fn sample_rate(&self) -> f32 {
        self.session.sample_rate()
    }

    /// Snapshots lost to a full ring so far.
    pub fn dropped_snapshots(&self) -> u64 {
        self.dropped_snapshots
    }

    /// Render one mono block, applying pending control messages first.
    pub fn render_block(&mut self, out: &mut [f32]) {
        let now = self.clock.now();
        self.session.drain(now, &mut self.rx);
        self.sync_clock();

        let sample_rate = self.session.sample_rate();
        let mut offset = 0;
        while offset < out.len() {
            self.fire_due_step();

            let remaining = out.len() - offset;
            let frames = self
                .clock
                .frames_until_next()
                .map_or(remaining, |n| n.clamp(1, remaining));

            let ctx = RenderCtx::new(sample_rate, self.clock.now());
            self.session
                .render_block(&mut out[offset..offset + frames], &ctx);
            self.clock.advance(frames);
            offset += frames;
        }
    }

    /// Render into an interleaved buffer, duplicating mono to every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let mut mono = std::mem::take(&mut self.mono);

        for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let block = &mut mono[..frames];
            self.render_block(block);

            for (frame, &sample) in chunk.chunks_mut(channels).zip(block.iter()) {
                frame.fill(sample);
            }
        }

        self.mono = mono;
    }

    fn sync_clock(&mut self) {
        match (self.session.is_running(), self.clock.is_running()) {
            (true, false) => self.clock.start(),
            (false, true) => self.clock.stop(),
            _ => {}
        }
    }

    fn fire_due_step(&mut self) {
        let Some(target) = self.clock.take_due() else {
            return;
        };
        let now = self.clock.now();
        let Some(snapshot) = self.session.step(now, target) else {
            return;
        };

        let mut slot = self
            .spare
            .take()
            .or_else(|| self.recycled.pop().ok())
            .unwrap_or_default();
        slot.copy_from(snapshot);

        if let Err(PushError::Full(slot)) = self.snapshots.push(slot) {
            if self.dropped_snapshots == 0 {
                warn!("Snapshot queue full, dropping new snapshots");
            }
            self.dropped_snapshots += 1;
            self.spare = Some(slot);
        }
    }
}
