use log::warn;
use rtrb::{Consumer, Producer};

use crate::{
    error::{Error, Result},
    graph::bus::EffectParam,
    synth::{message::ToneMessage, snapshot::Snapshot},
};

/// Control-side handle. Every call is a non-blocking push onto the control
/// ring; the audio thread applies it at the top of its next block.
pub struct ToneHandle {
    tx: Producer<ToneMessage>,
    group_count: usize,
}

impl ToneHandle {
    pub(crate) fn new(tx: Producer<ToneMessage>, group_count: usize) -> Self {
        Self { tx, group_count }
    }

    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn start(&mut self) -> Result<()> {
        self.send(ToneMessage::Start)
    }

    pub fn stop(&mut self) -> Result<()> {
        self.send(ToneMessage::Stop)
    }

    /// Gain is clamped to `[0, 1]` on the audio side; the index is checked
    /// here.
    pub fn set_group_gain(&mut self, index: usize, gain: f64) -> Result<()> {
        if index >= self.group_count {
            return Err(Error::GroupOutOfRange {
                index,
                count: self.group_count,
            });
        }
        self.send(ToneMessage::SetGroupGain { index, gain })
    }

    pub fn set_master_volume(&mut self, volume: f64) -> Result<()> {
        self.send(ToneMessage::SetMasterVolume(volume))
    }

    pub fn set_effect_parameter(&mut self, param: EffectParam, value: f64) -> Result<()> {
        self.send(ToneMessage::SetEffectParameter { param, value })
    }

    /// Like [`ToneHandle::set_effect_parameter`], resolving `room_size`,
    /// `damping` or `wet` by name.
    pub fn set_effect_parameter_by_name(&mut self, name: &str, value: f64) -> Result<()> {
        let param = name.parse()?;
        self.set_effect_parameter(param, value)
    }

    fn send(&mut self, message: ToneMessage) -> Result<()> {
        self.tx.push(message).map_err(|_| {
            warn!("Control queue full, dropping {message:?}");
            Error::ControlQueueFull
        })
    }
}

/// Consumer end of the snapshot ring.
///
/// Snapshots handed back with [`SnapshotReceiver::recycle`] return to the
/// engine, which refills them instead of allocating new ones.
pub struct SnapshotReceiver {
    rx: Consumer<Snapshot>,
    recycled: Producer<Snapshot>,
}

impl SnapshotReceiver {
    pub(crate) fn new(rx: Consumer<Snapshot>, recycled: Producer<Snapshot>) -> Self {
        Self { rx, recycled }
    }

    /// Next snapshot in step order, if one is waiting.
    pub fn try_recv(&mut self) -> Option<Snapshot> {
        self.rx.pop().ok()
    }

    /// Drain everything waiting and keep only the newest. The older ones
    /// are recycled.
    pub fn latest(&mut self) -> Option<Snapshot> {
        let mut latest = None;
        while let Ok(snapshot) = self.rx.pop() {
            if let Some(older) = latest.replace(snapshot) {
                self.recycle(older);
            }
        }
        latest
    }

    /// Give a snapshot back to the engine for reuse. Dropped here if the
    /// return ring is full.
    pub fn recycle(&mut self, snapshot: Snapshot) {
        let _ = self.recycled.push(snapshot);
    }

    pub fn pending(&self) -> usize {
        self.rx.slots()
    }
}
