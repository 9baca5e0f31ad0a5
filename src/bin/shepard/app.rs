//! Shepard - audio host and control loop

use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{self, Event, KeyEventKind},
    queue, terminal,
};
use log::{info, warn};

use shepard_dsp::{ShepardEngine, SnapshotReceiver, ToneConfig};

use super::controls::Controls;

/// Rate used when no audio device is driving the engine.
const HEADLESS_SAMPLE_RATE: f32 = 48_000.0;
const HEADLESS_BLOCK: usize = 1_024;

/// Keeps whatever is pulling audio alive.
enum Output {
    Device(cpal::Stream),
    Headless {
        stop: Arc<AtomicBool>,
        worker: thread::JoinHandle<()>,
    },
}

impl Output {
    fn shutdown(self) {
        match self {
            Output::Device(stream) => drop(stream),
            Output::Headless { stop, worker } => {
                stop.store(true, Ordering::Relaxed);
                if worker.join().is_err() {
                    warn!("Headless render thread panicked");
                }
            }
        }
    }
}

/// Main application builder
pub struct Shepard {
    config: ToneConfig,
    headless: bool,
}

impl Shepard {
    pub fn new(config: ToneConfig) -> Self {
        Self {
            config,
            headless: false,
        }
    }

    /// Skip the audio device and render into nothing on a timer.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let (output, controls, snapshots) = if self.headless {
            self.start_headless()?
        } else {
            match self.start_device() {
                Ok(started) => started,
                Err(err) => {
                    warn!("No audio output ({err:#}), computing headless");
                    self.start_headless()?
                }
            }
        };

        println!("=== Shepard ===");
        println!("space start/stop | up/down volume | 1-9 select group | +/- gain | r/R room | q quit");
        println!();

        terminal::enable_raw_mode().wrap_err("failed to enter raw mode")?;
        let result = control_loop(controls, snapshots);
        terminal::disable_raw_mode().wrap_err("failed to leave raw mode")?;
        println!();

        output.shutdown();
        result
    }

    fn start_device(&self) -> EyreResult<(Output, Controls, SnapshotReceiver)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!("Output: {sample_rate} Hz, {channels} channels");

        let (mut engine, handle, snapshots) = ShepardEngine::new(&self.config, sample_rate)?;
        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| engine.render_interleaved(data, channels),
            |err| log::error!("Audio error: {err}"),
            None,
        )?;
        stream.play()?;

        let controls = Controls::new(handle, &self.config);
        Ok((Output::Device(stream), controls, snapshots))
    }

    fn start_headless(&self) -> EyreResult<(Output, Controls, SnapshotReceiver)> {
        let (mut engine, handle, snapshots) =
            ShepardEngine::new(&self.config, HEADLESS_SAMPLE_RATE)?;
        let stop = Arc::new(AtomicBool::new(false));

        let block_time = Duration::from_secs_f64(HEADLESS_BLOCK as f64 / HEADLESS_SAMPLE_RATE as f64);
        let worker = thread::spawn({
            let stop = Arc::clone(&stop);
            move || {
                let mut block = vec![0.0f32; HEADLESS_BLOCK];
                while !stop.load(Ordering::Relaxed) {
                    engine.render_block(&mut block);
                    thread::sleep(block_time);
                }
            }
        });

        info!("Headless at {HEADLESS_SAMPLE_RATE} Hz");
        let controls = Controls::new(handle, &self.config);
        Ok((Output::Headless { stop, worker }, controls, snapshots))
    }
}

fn control_loop(mut controls: Controls, mut snapshots: SnapshotReceiver) -> EyreResult<()> {
    let mut stdout = std::io::stdout();
    let mut pitch = None;

    while !controls.should_quit {
        // Keep only the latest snapshot
        if let Some(snapshot) = snapshots.latest() {
            pitch = snapshot.loudest().map(|v| v.frequency);
            snapshots.recycle(snapshot);
        }

        write!(stdout, "\r{}", controls.status(pitch))?;
        queue!(stdout, terminal::Clear(terminal::ClearType::UntilNewLine))?;
        stdout.flush()?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Err(err) = controls.handle_key(key.code) {
                        warn!("{err}");
                    }
                }
            }
        }
    }

    Ok(())
}
