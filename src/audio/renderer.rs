use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::sequencer::{OnsetRenderer, Voice};
use crate::synth::{Grain, HatParams, KickParams, NoiseBuffer, SnareParams};

/// Builds one grain per onset and hands it to the audio callback.
/// Fire-and-forget: never blocks, and a full queue drops the hit rather
/// than stalling the poll loop.
#[derive(Clone)]
pub struct RendererHandle {
    tx: Sender<Grain>,
    sample_rate: f32,
    noise: Arc<NoiseBuffer>,
    kick: KickParams,
    snare: SnareParams,
    hat: HatParams,
}

impl RendererHandle {
    pub fn new(tx: Sender<Grain>, sample_rate: f32, noise: Arc<NoiseBuffer>) -> Self {
        Self {
            tx,
            sample_rate,
            noise,
            kick: KickParams::default(),
            snare: SnareParams::default(),
            hat: HatParams::default(),
        }
    }

    fn grain(&self, voice: Voice, start: u64) -> Grain {
        match voice {
            Voice::Kick => Grain::kick(self.kick.clone(), self.sample_rate, start),
            Voice::Snare => Grain::snare(
                self.snare.clone(),
                self.sample_rate,
                self.noise.clone(),
                start,
            ),
            Voice::Hat => Grain::hat(self.hat.clone(), self.sample_rate, self.noise.clone(), start),
        }
    }
}

impl OnsetRenderer for RendererHandle {
    fn render(&mut self, voice: Voice, at: f64) {
        let start = (at.max(0.0) * self.sample_rate as f64).round() as u64;
        let _ = self.tx.try_send(self.grain(voice, start));
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    fn handle(capacity: usize) -> (RendererHandle, crossbeam_channel::Receiver<Grain>) {
        let (tx, rx) = bounded(capacity);
        let noise = Arc::new(NoiseBuffer::new(1024, 1));
        (RendererHandle::new(tx, 48000.0, noise), rx)
    }

    #[test]
    fn onset_time_becomes_a_start_sample() {
        let (mut renderer, rx) = handle(8);
        renderer.render(Voice::Snare, 0.25);
        let grain = rx.try_recv().unwrap();
        assert_eq!(grain.voice(), Voice::Snare);
        assert_eq!(grain.start(), 12000);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let (mut renderer, rx) = handle(1);
        renderer.render(Voice::Kick, 0.0);
        renderer.render(Voice::Hat, 0.1); // queue full, silently dropped
        assert_eq!(rx.try_recv().unwrap().voice(), Voice::Kick);
        assert!(rx.try_recv().is_err());
    }
}
