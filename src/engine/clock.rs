use log::warn;

/// Sample-counting clock that fires one step per step interval.
///
/// Step boundaries are tracked in seconds but compared in whole frames, so
/// the boundary always lands on the first sample at or after it. Each step
/// targets the following boundary, which is strictly ahead of the sample
/// the step fires on.
#[derive(Debug, Clone)]
pub struct StepClock {
    sample_rate: f64,
    step_interval: f64,
    frames: u64,
    next_step: Option<f64>,
}

impl StepClock {
    pub fn new(sample_rate: f32, step_interval: f64) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            step_interval,
            frames: 0,
            next_step: None,
        }
    }

    /// Audio-clock position in seconds.
    #[inline]
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn step_interval(&self) -> f64 {
        self.step_interval
    }

    pub fn is_running(&self) -> bool {
        self.next_step.is_some()
    }

    /// Schedule the first boundary at the current position.
    pub fn start(&mut self) {
        self.next_step = Some(self.now());
    }

    pub fn stop(&mut self) {
        self.next_step = None;
    }

    /// If a boundary has been reached, consume it and return the step's
    /// target time (the next boundary).
    ///
    /// When rendering fell more than one interval behind, the missed
    /// boundaries are skipped rather than fired back to back.
    pub fn take_due(&mut self) -> Option<f64> {
        let boundary = self.next_step?;
        if self.frames < self.frame_of(boundary) {
            return None;
        }

        let mut target = boundary + self.step_interval;
        if self.frames >= self.frame_of(target) {
            let behind = self.now() - boundary;
            let missed = (behind / self.step_interval).floor();
            target = boundary + (missed + 1.0) * self.step_interval;
            if self.frames >= self.frame_of(target) {
                target += self.step_interval;
            }
            warn!("Step clock fell {behind:.3}s behind, skipping {missed} steps");
        }

        self.next_step = Some(target);
        Some(target)
    }

    /// Frames left before the next boundary, `None` while stopped.
    pub fn frames_until_next(&self) -> Option<usize> {
        self.next_step
            .map(|boundary| self.frame_of(boundary).saturating_sub(self.frames) as usize)
    }

    pub fn advance(&mut self, frames: usize) {
        self.frames += frames as u64;
    }

    /// First frame at or after `time`.
    #[inline]
    fn frame_of(&self, time: f64) -> u64 {
        (time * self.sample_rate).ceil().max(0.0) as u64
    }
}
