use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::playhead::Playhead;
use super::scheduler::{AudioClock, OnsetRenderer, Scheduler, TICK_INTERVAL};
use super::state::SharedState;

/// Drives the scheduler on a fixed cadence while playing. `play` spawns
/// the poll thread, `stop` cancels it via a token and joins. Sounds
/// already handed to the renderer are never cancelled; they decay on
/// their own.
pub struct Transport<C, R> {
    state: SharedState,
    clock: C,
    renderer: R,
    playhead: Playhead,
    cancel: Option<Arc<AtomicBool>>,
    poll: Option<JoinHandle<()>>,
}

impl<C, R> Transport<C, R>
where
    C: AudioClock + Clone + Send + 'static,
    R: OnsetRenderer + Clone + Send + 'static,
{
    pub fn new(state: SharedState, clock: C, renderer: R, playhead: Playhead) -> Self {
        Self {
            state,
            clock,
            renderer,
            playhead,
            cancel: None,
            poll: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.read().playing
    }

    pub fn toggle(&mut self) {
        if self.poll.is_some() {
            self.stop();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if self.poll.is_some() {
            return;
        }
        self.state.write().playing = true;

        let cancel = Arc::new(AtomicBool::new(false));
        // A fresh scheduler per run: the cursor resets to (now, 0) on
        // every stopped-to-playing transition.
        let mut scheduler = Scheduler::new(
            self.state.clone(),
            self.clock.clone(),
            self.renderer.clone(),
            self.playhead.clone(),
        );
        let token = cancel.clone();
        self.poll = Some(thread::spawn(move || {
            while !token.load(Ordering::Relaxed) {
                scheduler.tick();
                thread::sleep(TICK_INTERVAL);
            }
        }));
        self.cancel = Some(cancel);
    }

    pub fn stop(&mut self) {
        // Flip playing first so a playhead signal in flight is suppressed
        // at fire time, then halt the poll cadence.
        {
            let mut state = self.state.write();
            state.playing = false;
            state.current_step = None;
        }
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
        if let Some(poll) = self.poll.take() {
            let _ = poll.join();
        }
    }
}

impl<C, R> Drop for Transport<C, R> {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::Relaxed);
        }
    }
}
