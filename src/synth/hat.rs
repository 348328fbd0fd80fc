use std::sync::Arc;

use super::decay_env;
use super::filter::Highpass;
use super::noise::NoiseBuffer;
use super::params::HatParams;

/// One hat hit: the shared noise buffer through a 5 kHz high-pass with a
/// very short decay. No tonal component.
pub struct HatGrain {
    sample_rate: f32,
    pos: usize,
    duration: usize,
    highpass: Highpass,
    noise: Arc<NoiseBuffer>,
    params: HatParams,
}

impl HatGrain {
    pub fn new(params: HatParams, sample_rate: f32, noise: Arc<NoiseBuffer>) -> Self {
        Self {
            sample_rate,
            pos: 0,
            duration: (sample_rate * params.decay) as usize,
            highpass: Highpass::new(sample_rate, params.cutoff),
            noise,
            params,
        }
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.duration
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.is_done() {
            return 0.0;
        }
        let t = self.pos as f32 / self.sample_rate;
        let sample = self.highpass.process(self.noise.at(self.pos))
            * decay_env(t, self.params.decay);
        self.pos += 1;
        sample * 0.4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::params::SnareParams;

    #[test]
    fn tick_is_short() {
        let sr = 48000.0;
        let params = HatParams::default();
        let mut hat = HatGrain::new(params.clone(), sr, Arc::new(NoiseBuffer::new(48000, 7)));
        let mut produced = 0;
        while !hat.is_done() {
            hat.next_sample();
            produced += 1;
        }
        assert_eq!(produced, (sr * params.decay) as usize);
        // Much shorter than a snare.
        assert!(params.decay < SnareParams::default().noise_decay);
    }

    #[test]
    fn produces_signal_then_silence() {
        let sr = 48000.0;
        let mut hat = HatGrain::new(HatParams::default(), sr, Arc::new(NoiseBuffer::new(48000, 7)));
        let mut peak = 0.0f32;
        while !hat.is_done() {
            peak = peak.max(hat.next_sample().abs());
        }
        assert!(peak > 0.05, "peak {peak}");
        assert_eq!(hat.next_sample(), 0.0);
    }
}
