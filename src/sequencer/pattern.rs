use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_STEPS: usize = 16;
pub const NUM_VOICES: usize = 3;

pub const MIN_BPM: f64 = 30.0;
pub const MAX_BPM: f64 = 250.0;

pub const MIN_BEATS: usize = 1;
pub const MAX_BEATS: usize = 16;
pub const MIN_SUBDIVISION: usize = 1;
pub const MAX_SUBDIVISION: usize = 8;

/// Clamp a tempo at the point of assignment, so the scheduler never
/// sees an out-of-range value. Non-numeric input pins to the minimum
/// instead of letting NaN slip through `clamp`.
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return MIN_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voice {
    Kick = 0,
    Snare = 1,
    Hat = 2,
}

impl Voice {
    pub const ALL: [Voice; NUM_VOICES] = [Voice::Kick, Voice::Snare, Voice::Hat];

    pub fn name(&self) -> &'static str {
        match self {
            Voice::Kick => "KICK",
            Voice::Snare => "SNARE",
            Voice::Hat => "HAT",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Voice::Kick),
            1 => Some(Voice::Snare),
            2 => Some(Voice::Hat),
            _ => None,
        }
    }
}

/// Cycle length and step subdivision. Together with the tempo these
/// determine the time between onsets: (60 / bpm) / subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meter {
    beats_per_cycle: usize,
    subdivision: usize,
}

/// Deserialization routes through `Meter::new` so persisted values are
/// clamped like every other assignment; a stored cycle length of zero
/// must never reach the scheduler's modulus.
impl<'de> Deserialize<'de> for Meter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            beats_per_cycle: usize,
            subdivision: usize,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Meter::new(raw.beats_per_cycle, raw.subdivision))
    }
}

impl Meter {
    pub fn new(beats_per_cycle: usize, subdivision: usize) -> Self {
        Self {
            beats_per_cycle: beats_per_cycle.clamp(MIN_BEATS, MAX_BEATS),
            subdivision: subdivision.clamp(MIN_SUBDIVISION, MAX_SUBDIVISION),
        }
    }

    pub fn beats_per_cycle(&self) -> usize {
        self.beats_per_cycle
    }

    pub fn subdivision(&self) -> usize {
        self.subdivision
    }

    pub fn set_beats_per_cycle(&mut self, beats: usize) {
        self.beats_per_cycle = beats.clamp(MIN_BEATS, MAX_BEATS);
    }

    pub fn set_subdivision(&mut self, subdivision: usize) {
        self.subdivision = subdivision.clamp(MIN_SUBDIVISION, MAX_SUBDIVISION);
    }

    /// Seconds between consecutive onsets at the given tempo.
    pub fn seconds_per_step(&self, bpm: f64) -> f64 {
        (60.0 / bpm) / self.subdivision as f64
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new(MAX_BEATS, 1)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pattern {
    /// steps[voice][step]
    pub steps: [[bool; MAX_STEPS]; NUM_VOICES],
}

impl Pattern {
    pub fn new() -> Self {
        Self {
            steps: [[false; MAX_STEPS]; NUM_VOICES],
        }
    }

    /// Four-on-the-floor kick, backbeat snare, off-beat hats.
    pub fn basic_beat() -> Self {
        let mut pattern = Self::new();
        for step in (0..MAX_STEPS).step_by(4) {
            pattern.set(Voice::Kick, step, true);
        }
        for step in (4..MAX_STEPS).step_by(8) {
            pattern.set(Voice::Snare, step, true);
        }
        for step in (2..MAX_STEPS).step_by(4) {
            pattern.set(Voice::Hat, step, true);
        }
        pattern
    }

    /// Toggle a step and return its new state.
    pub fn toggle(&mut self, voice: Voice, step: usize) -> bool {
        if step < MAX_STEPS {
            self.steps[voice as usize][step] = !self.steps[voice as usize][step];
            self.steps[voice as usize][step]
        } else {
            false
        }
    }

    pub fn set(&mut self, voice: Voice, step: usize, value: bool) {
        if step < MAX_STEPS {
            self.steps[voice as usize][step] = value;
        }
    }

    /// Out-of-range steps read as inactive, never as errors.
    pub fn get(&self, voice: Voice, step: usize) -> bool {
        if step < MAX_STEPS {
            self.steps[voice as usize][step]
        } else {
            false
        }
    }

    pub fn clear_voice(&mut self, voice: Voice) {
        self.steps[voice as usize] = [false; MAX_STEPS];
    }

    pub fn fill_voice(&mut self, voice: Voice) {
        self.steps[voice as usize] = [true; MAX_STEPS];
    }

    pub fn clear_all(&mut self) {
        for voice in Voice::ALL {
            self.clear_voice(voice);
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}
