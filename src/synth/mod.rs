pub mod filter;
pub mod hat;
pub mod kick;
pub mod noise;
pub mod params;
pub mod snare;

use std::sync::Arc;

pub use hat::HatGrain;
pub use kick::KickGrain;
pub use noise::NoiseBuffer;
pub use params::{HatParams, KickParams, SnareParams, ENV_FLOOR};
pub use snare::SnareGrain;

use crate::sequencer::Voice;

/// Exponential decay from 1.0 at t=0 to ENV_FLOOR at t=dur, continuing
/// below the floor afterwards. Never exactly zero.
pub(crate) fn decay_env(t: f32, dur: f32) -> f32 {
    ENV_FLOOR.powf(t / dur)
}

enum GrainVoice {
    Kick(KickGrain),
    Snare(SnareGrain),
    Hat(HatGrain),
}

/// One scheduled percussion hit: a self-terminating voice chain
/// programmed with an absolute start sample. Independent of every other
/// grain; nothing is retained once it finishes decaying.
pub struct Grain {
    start: u64,
    voice: GrainVoice,
}

impl Grain {
    pub fn kick(params: KickParams, sample_rate: f32, start: u64) -> Self {
        Self {
            start,
            voice: GrainVoice::Kick(KickGrain::new(params, sample_rate)),
        }
    }

    pub fn snare(
        params: SnareParams,
        sample_rate: f32,
        noise: Arc<NoiseBuffer>,
        start: u64,
    ) -> Self {
        Self {
            start,
            voice: GrainVoice::Snare(SnareGrain::new(params, sample_rate, noise)),
        }
    }

    pub fn hat(params: HatParams, sample_rate: f32, noise: Arc<NoiseBuffer>, start: u64) -> Self {
        Self {
            start,
            voice: GrainVoice::Hat(HatGrain::new(params, sample_rate, noise)),
        }
    }

    pub fn voice(&self) -> Voice {
        match self.voice {
            GrainVoice::Kick(_) => Voice::Kick,
            GrainVoice::Snare(_) => Voice::Snare,
            GrainVoice::Hat(_) => Voice::Hat,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn is_done(&self) -> bool {
        match &self.voice {
            GrainVoice::Kick(g) => g.is_done(),
            GrainVoice::Snare(g) => g.is_done(),
            GrainVoice::Hat(g) => g.is_done(),
        }
    }

    /// Sample for the absolute frame `frame`. Silent before the start
    /// sample; a grain that arrived late still plays from its beginning
    /// rather than being dropped.
    pub fn render(&mut self, frame: u64) -> f32 {
        if frame < self.start {
            return 0.0;
        }
        match &mut self.voice {
            GrainVoice::Kick(g) => g.next_sample(),
            GrainVoice::Snare(g) => g.next_sample(),
            GrainVoice::Hat(g) => g.next_sample(),
        }
    }
}
