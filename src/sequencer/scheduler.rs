use std::time::Duration;

use super::pattern::{Voice, NUM_VOICES};
use super::state::SharedState;

/// Cadence of the transport poll loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// How far ahead of the audio clock onsets are queued. Must exceed the
/// worst-case gap between polls (TICK_INTERVAL plus scheduling slack) so
/// every onset reaches the renderer before its deadline.
pub const LOOKAHEAD_SECS: f64 = 0.1;

/// Monotonic timebase supplied by the audio backend, authoritative for
/// onset scheduling. Returns None until the backend has started; ticks
/// against a dead clock are benign no-ops, not errors.
pub trait AudioClock {
    fn now(&self) -> Option<f64>;
}

/// Consumes (voice, absolute onset time) pairs. Must not block.
pub trait OnsetRenderer {
    fn render(&mut self, voice: Voice, at: f64);
}

/// Notified once per scheduled step so a display can follow the playhead.
pub trait StepListener {
    fn step_scheduled(&mut self, step: usize, at: f64);
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    next_onset: f64,
    step: usize,
}

/// Look-ahead scheduler: on each poll, queues every onset that falls
/// inside the horizon, then advances the cursor. Timing is derived from
/// the audio clock, not from the wall-clock gap between polls, which is
/// what keeps onsets drift-free despite poll jitter.
pub struct Scheduler<C, R, P> {
    state: SharedState,
    clock: C,
    renderer: R,
    playhead: P,
    lookahead: f64,
    cursor: Option<Cursor>,
}

impl<C, R, P> Scheduler<C, R, P>
where
    C: AudioClock,
    R: OnsetRenderer,
    P: StepListener,
{
    pub fn new(state: SharedState, clock: C, renderer: R, playhead: P) -> Self {
        Self {
            state,
            clock,
            renderer,
            playhead,
            lookahead: LOOKAHEAD_SECS,
            cursor: None,
        }
    }

    /// Queue every onset inside the look-ahead window. Returns how many
    /// onsets were emitted. A no-op while stopped or before the audio
    /// clock is live.
    pub fn tick(&mut self) -> usize {
        if !self.state.read().playing {
            return 0;
        }
        let Some(now) = self.clock.now() else {
            return 0;
        };
        // Cursor starts at (now, 0) on the first live tick after play.
        let mut cursor = *self.cursor.get_or_insert(Cursor {
            next_onset: now,
            step: 0,
        });

        let mut emitted = 0;
        while cursor.next_onset < now + self.lookahead {
            // Tempo, meter and pattern are re-read per onset: changes take
            // effect on the next onset, never retroactively.
            let (bpm, meter, active) = {
                let state = self.state.read();
                let mut active = [false; NUM_VOICES];
                for voice in Voice::ALL {
                    active[voice as usize] = state.pattern.get(voice, cursor.step);
                }
                (state.bpm, state.meter, active)
            };

            for voice in Voice::ALL {
                if active[voice as usize] {
                    self.renderer.render(voice, cursor.next_onset);
                }
            }
            self.playhead.step_scheduled(cursor.step, cursor.next_onset);

            cursor.next_onset += meter.seconds_per_step(bpm);
            cursor.step = (cursor.step + 1) % meter.beats_per_cycle();
            emitted += 1;
        }

        self.cursor = Some(cursor);
        emitted
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sequencer::pattern::{Meter, MIN_BPM};
    use crate::sequencer::state::{shared, SequencerState};

    struct TestClock(Rc<RefCell<Option<f64>>>);

    impl AudioClock for TestClock {
        fn now(&self) -> Option<f64> {
            *self.0.borrow()
        }
    }

    #[derive(Clone, Default)]
    struct RenderLog(Rc<RefCell<Vec<(Voice, f64)>>>);

    impl OnsetRenderer for RenderLog {
        fn render(&mut self, voice: Voice, at: f64) {
            self.0.borrow_mut().push((voice, at));
        }
    }

    #[derive(Clone, Default)]
    struct StepLog(Rc<RefCell<Vec<(usize, f64)>>>);

    impl StepListener for StepLog {
        fn step_scheduled(&mut self, step: usize, at: f64) {
            self.0.borrow_mut().push((step, at));
        }
    }

    struct Fixture {
        now: Rc<RefCell<Option<f64>>>,
        renders: RenderLog,
        steps: StepLog,
        state: SharedState,
        scheduler: Scheduler<TestClock, RenderLog, StepLog>,
    }

    fn fixture(bpm: f64, beats: usize, subdivision: usize) -> Fixture {
        let mut seq = SequencerState::new(bpm, Meter::new(beats, subdivision));
        seq.playing = true;
        let state = shared(seq);
        let now = Rc::new(RefCell::new(Some(0.0)));
        let renders = RenderLog::default();
        let steps = StepLog::default();
        let scheduler = Scheduler::new(
            state.clone(),
            TestClock(now.clone()),
            renders.clone(),
            steps.clone(),
        );
        Fixture {
            now,
            renders,
            steps,
            state,
            scheduler,
        }
    }

    #[test]
    fn single_tick_schedules_only_onsets_inside_horizon() {
        // 120 BPM, quarter-note steps: 0.5 s apart. Only the onset at
        // t=0 falls inside the 0.1 s horizon.
        let mut f = fixture(120.0, 4, 1);
        assert_eq!(f.scheduler.tick(), 1);
        let steps = f.steps.0.borrow();
        assert_eq!(steps.as_slice(), &[(0, 0.0)]);
    }

    #[test]
    fn step_sequence_wraps_without_skips() {
        let mut f = fixture(120.0, 4, 1);
        // Walk the clock far enough for two full cycles.
        for poll in 0..200 {
            *f.now.borrow_mut() = Some(poll as f64 * 0.025);
            f.scheduler.tick();
        }
        let steps = f.steps.0.borrow();
        assert!(steps.len() >= 8);
        for (i, &(step, _)) in steps.iter().enumerate() {
            assert_eq!(step, i % 4);
        }
    }

    #[test]
    fn onset_times_are_strictly_increasing_with_step_spacing() {
        let mut f = fixture(120.0, 4, 2);
        for poll in 0..100 {
            *f.now.borrow_mut() = Some(poll as f64 * 0.025);
            f.scheduler.tick();
        }
        let steps = f.steps.0.borrow();
        for pair in steps.windows(2) {
            let dt = pair[1].1 - pair[0].1;
            assert!((dt - 0.25).abs() < 1e-9, "spacing was {dt}");
        }
    }

    #[test]
    fn tick_while_stopped_emits_nothing() {
        let mut f = fixture(120.0, 4, 1);
        f.state.write().playing = false;
        assert_eq!(f.scheduler.tick(), 0);
        assert!(f.renders.0.borrow().is_empty());
        assert!(f.steps.0.borrow().is_empty());
    }

    #[test]
    fn tick_before_clock_is_live_is_a_noop() {
        let mut f = fixture(120.0, 4, 1);
        *f.now.borrow_mut() = None;
        assert_eq!(f.scheduler.tick(), 0);
        // Clock comes up later; the cursor starts at that instant.
        *f.now.borrow_mut() = Some(3.0);
        assert_eq!(f.scheduler.tick(), 1);
        assert_eq!(f.steps.0.borrow()[0], (0, 3.0));
    }

    #[test]
    fn tempo_change_applies_from_next_onset() {
        let mut f = fixture(120.0, 16, 1);
        // First poll emits the t=0 onset at the old tempo.
        f.scheduler.tick();
        f.state.write().set_bpm(60.0);
        for poll in 1..80 {
            *f.now.borrow_mut() = Some(poll as f64 * 0.025);
            f.scheduler.tick();
        }
        let steps = f.steps.0.borrow();
        assert!(steps.len() >= 3);
        // The first advance was committed at the old tempo (0.5 s); every
        // advance after the change uses the new 1.0 s spacing.
        assert_eq!(steps[0], (0, 0.0));
        assert!((steps[1].1 - 0.5).abs() < 1e-9);
        for pair in steps[1..].windows(2) {
            assert!(((pair[1].1 - pair[0].1) - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn only_active_voices_reach_the_renderer() {
        let mut f = fixture(120.0, 4, 1);
        f.state.write().pattern.set(Voice::Kick, 2, true);
        for poll in 0..80 {
            *f.now.borrow_mut() = Some(poll as f64 * 0.025);
            f.scheduler.tick();
        }
        let renders = f.renders.0.borrow();
        assert!(!renders.is_empty());
        for &(voice, at) in renders.iter() {
            assert_eq!(voice, Voice::Kick);
            // Step 2 recurs every 2.0 s starting at 1.0 s.
            let phase = (at - 1.0) % 2.0;
            assert!(phase.abs() < 1e-9, "unexpected onset at {at}");
        }
    }

    #[test]
    fn loaded_state_with_degenerate_meter_still_schedules() {
        // A stored zero cycle length or zero tempo must arrive clamped;
        // the modulus and the step spacing both stay well-defined.
        let mut doc = serde_json::to_value(SequencerState::default()).unwrap();
        doc["bpm"] = serde_json::json!(0.0);
        doc["meter"]["beats_per_cycle"] = serde_json::json!(0);
        doc["meter"]["subdivision"] = serde_json::json!(0);
        let mut loaded: SequencerState = serde_json::from_value(doc).unwrap();
        assert_eq!(loaded.bpm, MIN_BPM);
        loaded.playing = true;

        let state = shared(loaded);
        let now = Rc::new(RefCell::new(Some(0.0)));
        let steps = StepLog::default();
        let mut scheduler = Scheduler::new(
            state,
            TestClock(now),
            RenderLog::default(),
            steps.clone(),
        );
        assert_eq!(scheduler.tick(), 1);
        // Single-step cycle: the index pins to 0.
        assert_eq!(steps.0.borrow().as_slice(), &[(0, 0.0)]);
    }

    #[test]
    fn shrinking_the_cycle_changes_only_the_modulus() {
        let mut f = fixture(120.0, 8, 1);
        f.scheduler.tick();
        f.state.write().meter.set_beats_per_cycle(2);
        for poll in 1..200 {
            *f.now.borrow_mut() = Some(poll as f64 * 0.025);
            f.scheduler.tick();
        }
        let steps = f.steps.0.borrow();
        // After the change every scheduled step stays below the new cycle
        // length, and no onset was dropped.
        for pair in steps.windows(2) {
            assert!(pair[1].1 > pair[0].1);
        }
        for &(step, _) in steps.iter().skip(1) {
            assert!(step < 2);
        }
    }
}
