use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};

use super::scheduler::{AudioClock, StepListener};
use super::state::SharedState;

/// How long to hold a scheduled step back so its highlight lands roughly
/// when the sound is heard, not when it was queued.
pub fn display_delay(onset: f64, now: f64) -> Duration {
    Duration::from_secs_f64((onset - now).max(0.0))
}

/// Sends (step, onset time) to the playhead worker. Non-blocking; a full
/// queue drops the highlight, never the sound.
#[derive(Clone)]
pub struct Playhead {
    tx: Sender<(usize, f64)>,
}

impl Playhead {
    /// Spawn the worker that turns scheduled onsets into step highlights.
    /// Onsets arrive in increasing time order, so one worker handling
    /// them sequentially preserves display order.
    pub fn spawn<C>(state: SharedState, clock: C) -> Self
    where
        C: AudioClock + Send + 'static,
    {
        let (tx, rx) = bounded::<(usize, f64)>(64);
        thread::spawn(move || {
            while let Ok((step, onset)) = rx.recv() {
                if let Some(now) = clock.now() {
                    thread::sleep(display_delay(onset, now));
                }
                // Checked at fire time, not cancelled at schedule time:
                // a highlight queued before stop must not land after it.
                let mut state = state.write();
                if state.playing {
                    state.current_step = Some(step);
                }
            }
        });
        Self { tx }
    }
}

impl StepListener for Playhead {
    fn step_scheduled(&mut self, step: usize, at: f64) {
        let _ = self.tx.try_send((step, at));
    }
}
