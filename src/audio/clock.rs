use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::sequencer::AudioClock;

/// Audio clock derived from the output stream's frame counter. Advances
/// only as the device consumes frames, making it the authoritative,
/// jitter-free timebase for onset scheduling.
#[derive(Clone)]
pub struct StreamClock {
    frames: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    sample_rate: f64,
}

impl StreamClock {
    pub fn new(frames: Arc<AtomicU64>, running: Arc<AtomicBool>, sample_rate: f64) -> Self {
        Self {
            frames,
            running,
            sample_rate,
        }
    }
}

impl AudioClock for StreamClock {
    /// None until the first callback has run - scheduling against a
    /// backend that has not started is a no-op, not an error.
    fn now(&self) -> Option<f64> {
        if !self.running.load(Ordering::Relaxed) {
            return None;
        }
        Some(self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate)
    }
}
