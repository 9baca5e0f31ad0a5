//! Keyboard controls and the status line

use crossterm::event::KeyCode;
use shepard_dsp::{graph::EffectParam, Result, ToneConfig, ToneHandle};

const VOLUME_STEP: f64 = 0.05;
const GAIN_STEP: f64 = 0.1;
const ROOM_STEP: f64 = 0.1;

/// Control-side mirror of what has been sent to the engine.
pub struct Controls {
    handle: ToneHandle,
    running: bool,
    master_volume: f64,
    room_size: f64,
    gains: Vec<f64>,
    selected: usize,
    pub should_quit: bool,
}

impl Controls {
    pub fn new(handle: ToneHandle, config: &ToneConfig) -> Self {
        Self {
            handle,
            running: false,
            master_volume: config.master_volume.clamp(0.0, 1.0),
            room_size: config.reverb.room_size.clamp(0.0, 1.0),
            gains: config.groups.iter().map(|g| g.gain.clamp(0.0, 1.0)).collect(),
            selected: 0,
            should_quit: false,
        }
    }

    pub fn toggle(&mut self) -> Result<()> {
        if self.running {
            self.handle.stop()?;
        } else {
            self.handle.start()?;
        }
        self.running = !self.running;
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Result<()> {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle()?,
            KeyCode::Up => self.nudge_volume(VOLUME_STEP)?,
            KeyCode::Down => self.nudge_volume(-VOLUME_STEP)?,
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.gains.len() {
                    self.selected = index;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_gain(GAIN_STEP)?,
            KeyCode::Char('-') => self.nudge_gain(-GAIN_STEP)?,
            KeyCode::Char('R') => self.nudge_room(ROOM_STEP)?,
            KeyCode::Char('r') => self.nudge_room(-ROOM_STEP)?,
            _ => {}
        }
        Ok(())
    }

    fn nudge_volume(&mut self, delta: f64) -> Result<()> {
        self.master_volume = (self.master_volume + delta).clamp(0.0, 1.0);
        self.handle.set_master_volume(self.master_volume)
    }

    fn nudge_gain(&mut self, delta: f64) -> Result<()> {
        let Some(gain) = self.gains.get_mut(self.selected) else {
            return Ok(());
        };
        *gain = (*gain + delta).clamp(0.0, 1.0);
        self.handle.set_group_gain(self.selected, *gain)
    }

    fn nudge_room(&mut self, delta: f64) -> Result<()> {
        self.room_size = (self.room_size + delta).clamp(0.0, 1.0);
        self.handle
            .set_effect_parameter(EffectParam::RoomSize, self.room_size)
    }

    /// One-line summary; `pitch` is the loudest frequency heard, if known.
    pub fn status(&self, pitch: Option<f64>) -> String {
        let gains: Vec<String> = self
            .gains
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let marker = if i == self.selected { '>' } else { ' ' };
                format!("{marker}{}:{g:.1}", i + 1)
            })
            .collect();
        let pitch = pitch.map_or_else(|| "   --   ".to_owned(), |f| format!("{f:7.1}Hz"));

        format!(
            "{} | vol {:.2} | room {:.1} | {} | {}",
            if self.running { "playing" } else { "stopped" },
            self.master_volume,
            self.room_size,
            pitch,
            gains.join(" ")
        )
    }
}
