use std::sync::Arc;

use super::decay_env;
use super::filter::Highpass;
use super::noise::NoiseBuffer;
use super::params::SnareParams;

/// One snare hit: a triangle body for pitch layered with a high-passed
/// read of the shared noise buffer for the buzz.
pub struct SnareGrain {
    sample_rate: f32,
    pos: usize,
    duration: usize,
    tone_phase: f32,
    highpass: Highpass,
    noise: Arc<NoiseBuffer>,
    params: SnareParams,
}

impl SnareGrain {
    pub fn new(params: SnareParams, sample_rate: f32, noise: Arc<NoiseBuffer>) -> Self {
        let longest = params.tone_decay.max(params.noise_decay);
        Self {
            sample_rate,
            pos: 0,
            duration: (sample_rate * longest) as usize,
            tone_phase: 0.0,
            highpass: Highpass::new(sample_rate, params.noise_cutoff),
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

        self.tone_phase += self.params.tone_freq / self.sample_rate;
        if self.tone_phase >= 1.0 {
            self.tone_phase -= 1.0;
        }
        let triangle = 1.0 - 4.0 * (self.tone_phase - 0.5).abs();
        let tone = triangle * decay_env(t, self.params.tone_decay);

        let buzz = self.highpass.process(self.noise.at(self.pos))
            * decay_env(t, self.params.noise_decay);

        self.pos += 1;
        tone * 0.5 + buzz * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise() -> Arc<NoiseBuffer> {
        Arc::new(NoiseBuffer::new(48000, 12345))
    }

    #[test]
    fn runs_for_the_longer_of_the_two_decays() {
        let sr = 48000.0;
        let params = SnareParams::default();
        let expected = (sr * params.noise_decay) as usize;
        let mut snare = SnareGrain::new(params, sr, noise());
        let mut produced = 0;
        while !snare.is_done() {
            snare.next_sample();
            produced += 1;
        }
        assert_eq!(produced, expected);
    }

    #[test]
    fn concurrent_grains_share_one_noise_buffer() {
        let shared = noise();
        let a = SnareGrain::new(SnareParams::default(), 48000.0, shared.clone());
        let b = SnareGrain::new(SnareParams::default(), 48000.0, shared.clone());
        assert!(Arc::ptr_eq(&a.noise, &shared));
        assert!(Arc::ptr_eq(&a.noise, &b.noise));
    }

    #[test]
    fn output_decays_toward_silence() {
        let sr = 48000.0;
        let mut snare = SnareGrain::new(SnareParams::default(), sr, noise());
        let total = (sr * 0.2) as usize;
        let mut late_peak = 0.0f32;
        let mut any_signal = false;
        for n in 0..total {
            let s = snare.next_sample().abs();
            if s > 0.05 {
                any_signal = true;
            }
            if n > total * 9 / 10 {
                late_peak = late_peak.max(s);
            }
        }
        assert!(any_signal);
        assert!(late_peak < 0.05, "late peak {late_peak}");
    }
}
