use serde::{Deserialize, Serialize};

/// Envelope floor. Exponential decays land here instead of zero so the
/// ramp never degenerates and the gain never snaps audibly.
pub const ENV_FLOOR: f32 = 0.001;

/// Kick drum parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KickParams {
    pub pitch_start: f32, // 80-250 Hz, default 150
    pub pitch_floor: f32, // near-zero target of the pitch drop
    pub body_decay: f32,  // seconds, default 0.5
    pub click_freq: f32,  // Hz, low square transient
    pub click_len: f32,   // seconds, default 0.02
    pub click_gain: f32,  // 0-1, default 0.15
}

impl Default for KickParams {
    fn default() -> Self {
        Self {
            pitch_start: 150.0,
            pitch_floor: 0.01,
            body_decay: 0.5,
            click_freq: 55.0,
            click_len: 0.02,
            click_gain: 0.15,
        }
    }
}

/// Snare drum parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnareParams {
    pub tone_freq: f32,    // 100-250 Hz, default 180
    pub tone_decay: f32,   // seconds, default 0.15
    pub noise_cutoff: f32, // Hz, high-pass on the buzz, default 1000
    pub noise_decay: f32,  // seconds, default 0.2
}

impl Default for SnareParams {
    fn default() -> Self {
        Self {
            tone_freq: 180.0,
            tone_decay: 0.15,
            noise_cutoff: 1000.0,
            noise_decay: 0.2,
        }
    }
}

/// Hi-hat parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HatParams {
    pub cutoff: f32, // Hz, default 5000
    pub decay: f32,  // seconds, default 0.05
}

impl Default for HatParams {
    fn default() -> Self {
        Self {
            cutoff: 5000.0,
            decay: 0.05,
        }
    }
}
