/// Fixed-cutoff high-pass, trapezoidal SVF with no resonance. One
/// instance per grain; state never crosses grain boundaries.
pub struct Highpass {
    g: f32,
    k: f32,
    low: f32,
    band: f32,
}

impl Highpass {
    pub fn new(sample_rate: f32, cutoff: f32) -> Self {
        let freq = cutoff.clamp(20.0, sample_rate * 0.49);
        Self {
            g: (std::f32::consts::PI * freq / sample_rate).tan(),
            k: 2.0,
            low: 0.0,
            band: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let a1 = 1.0 / (1.0 + self.g * (self.g + self.k));
        let a2 = self.g * a1;
        let a3 = self.g * a2;

        let v3 = input - self.low - self.k * self.band;
        let v1 = a1 * self.band + a2 * v3;
        let v2 = self.low + a2 * self.band + a3 * v3;

        self.band = 2.0 * v1 - self.band;
        self.low = 2.0 * v2 - self.low;

        input - self.k * v1 - v2
    }
}
