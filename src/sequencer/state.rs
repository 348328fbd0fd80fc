use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize};

use super::pattern::{clamp_bpm, Meter, Pattern};

/// Stored tempo passes through the same clamp as every live assignment.
fn deserialize_bpm<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(clamp_bpm(f64::deserialize(deserializer)?))
}

/// Shared state between the UI, the transport poll loop and the playhead
/// worker. The scheduler reads it once per onset computation; writers win
/// with no mid-quantum locking - a slightly stale read is fine because a
/// tempo or pattern change only needs to take effect by the next onset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequencerState {
    #[serde(skip)]
    pub playing: bool,
    #[serde(deserialize_with = "deserialize_bpm")]
    pub bpm: f64,
    pub meter: Meter,
    pub pattern: Pattern,
    /// Step currently highlighted in the UI, driven by the playhead worker.
    #[serde(skip)]
    pub current_step: Option<usize>,
}

impl SequencerState {
    pub fn new(bpm: f64, meter: Meter) -> Self {
        Self {
            playing: false,
            bpm: clamp_bpm(bpm),
            meter,
            pattern: Pattern::new(),
            current_step: None,
        }
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = clamp_bpm(bpm);
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new(120.0, Meter::default())
    }
}

pub type SharedState = Arc<RwLock<SequencerState>>;

pub fn shared(state: SequencerState) -> SharedState {
    Arc::new(RwLock::new(state))
}
