/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: audio-clock time of the first sample in the block, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Audio-clock time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context for the block starting `frames` samples later.
    #[inline]
    pub fn advanced(&self, frames: usize) -> Self {
        Self {
            time: self.sample_time(frames),
            ..*self
        }
    }
}

/// Core trait for anything that renders a mono block of audio
pub trait GraphNode: Send {
    /// Overwrite `out` with this node's output for the block described by `ctx`.
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }
}
