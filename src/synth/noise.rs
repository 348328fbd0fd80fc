/// Fixed buffer of uniform noise in [-1, 1), generated once when the
/// audio backend comes up and shared read-only by every snare and hat
/// grain. Perceptual consistency between hits is acceptable, so the
/// buffer is never regenerated.
pub struct NoiseBuffer {
    samples: Vec<f32>,
}

impl NoiseBuffer {
    pub fn new(len: usize, seed: u32) -> Self {
        let mut state = seed.max(1);
        let samples = (0..len.max(1))
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                (state as f64 / (u32::MAX as f64 + 1.0) * 2.0 - 1.0) as f32
            })
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Wrapping read, so a grain can run past the buffer end.
    pub fn at(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }
}
