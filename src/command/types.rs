use serde::{Deserialize, Serialize};

use crate::sequencer::Voice;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    // Transport
    TogglePlayback,
    Play,
    Stop,

    // Tempo
    SetBpm(f64),
    AdjustBpm(f64),
    Tap,

    // Meter
    AdjustBeats(i32),
    AdjustSubdivision(i32),

    // Pattern
    ToggleStep { voice: Voice, step: usize },
    ClearVoice(Voice),
    FillVoice(Voice),
    ClearPattern,
    SeedBasicBeat,
}
