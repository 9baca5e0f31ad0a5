#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::graph::bus::EffectParam;

/// Control messages sent from the control thread to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ToneMessage {
    Start,
    Stop,
    SetGroupGain { index: usize, gain: f64 },
    SetMasterVolume(f64),
    SetEffectParameter { param: EffectParam, value: f64 },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ToneMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ToneMessage> {
    fn pop(&mut self) -> Option<ToneMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<ToneMessage> {
    fn pop(&mut self) -> Option<ToneMessage> {
        self.pop_front()
    }
}
