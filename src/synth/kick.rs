use super::decay_env;
use super::params::KickParams;

/// One kick hit: a sine body whose pitch falls exponentially from
/// pitch_start toward zero while the gain decays from 1.0 to the
/// envelope floor, plus a short low square click for attack definition.
pub struct KickGrain {
    sample_rate: f32,
    pos: usize,
    duration: usize,
    phase: f32,
    params: KickParams,
}

impl KickGrain {
    pub fn new(params: KickParams, sample_rate: f32) -> Self {
        Self {
            sample_rate,
            pos: 0,
            duration: (sample_rate * params.body_decay) as usize,
            phase: 0.0,
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
        self.pos += 1;

        // Exponential pitch ramp toward (near) zero.
        let ratio = self.params.pitch_floor / self.params.pitch_start;
        let freq = self.params.pitch_start * ratio.powf(t / self.params.body_decay);

        self.phase += freq / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        let body = (self.phase * std::f32::consts::TAU).sin() * decay_env(t, self.params.body_decay);

        let click = if t < self.params.click_len {
            let square = if (t * self.params.click_freq).fract() < 0.5 {
                1.0
            } else {
                -1.0
            };
            square * self.params.click_gain * decay_env(t, self.params.click_len)
        } else {
            0.0
        };

        (body + click) * 0.9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lasts_the_body_decay_then_stops() {
        let sr = 48000.0;
        let params = KickParams::default();
        let expected = (sr * params.body_decay) as usize;
        let mut kick = KickGrain::new(params, sr);
        let mut produced = 0;
        while !kick.is_done() {
            kick.next_sample();
            produced += 1;
        }
        assert_eq!(produced, expected);
        assert_eq!(kick.next_sample(), 0.0);
    }

    #[test]
    fn starts_loud_and_decays_to_the_floor() {
        let sr = 48000.0;
        let mut kick = KickGrain::new(KickParams::default(), sr);
        let mut early_peak = 0.0f32;
        let mut late_peak = 0.0f32;
        let total = (sr * 0.5) as usize;
        for n in 0..total {
            let s = kick.next_sample().abs();
            if n < total / 10 {
                early_peak = early_peak.max(s);
            } else if n > total * 9 / 10 {
                late_peak = late_peak.max(s);
            }
        }
        assert!(early_peak > 0.3, "early peak {early_peak}");
        assert!(late_peak < 0.02, "late peak {late_peak}");
    }
}
