pub mod pattern;
pub mod playhead;
pub mod scheduler;
pub mod state;
pub mod tap;
pub mod transport;

pub use pattern::{clamp_bpm, Meter, Pattern, Voice, MAX_BPM, MAX_STEPS, MIN_BPM, NUM_VOICES};
pub use playhead::Playhead;
pub use scheduler::{AudioClock, OnsetRenderer, Scheduler, StepListener};
pub use state::{shared, SequencerState, SharedState};
pub use tap::TapTempo;
pub use transport::Transport;
