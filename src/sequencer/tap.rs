use std::collections::VecDeque;

use super::pattern::clamp_bpm;

/// Sliding window size. Five taps give four intervals to average.
pub const TAP_WINDOW: usize = 5;

/// A pause longer than this abandons the window and starts over.
pub const TAP_TIMEOUT_MS: f64 = 3000.0;

/// Moving-average tap tempo estimator. Only produces an estimate once the
/// window is full; it never blends a stale window across a long pause.
pub struct TapTempo {
    taps: VecDeque<f64>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self {
            taps: VecDeque::with_capacity(TAP_WINDOW),
        }
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Register a tap at `now_ms` and return the new tempo estimate, if
    /// the window is full. The estimate is an integer BPM clamped to the
    /// playable range.
    pub fn tap(&mut self, now_ms: f64) -> Option<f64> {
        if let Some(&last) = self.taps.back() {
            if now_ms - last > TAP_TIMEOUT_MS {
                self.taps.clear();
            } else if now_ms <= last {
                // Zero or negative interval: discard this tap rather than
                // derive an infinite or negative BPM from it.
                return None;
            }
        }

        self.taps.push_back(now_ms);
        while self.taps.len() > TAP_WINDOW {
            self.taps.pop_front();
        }
        if self.taps.len() < TAP_WINDOW {
            return None;
        }

        // Average of consecutive intervals over the window.
        let first = *self.taps.front().unwrap();
        let last = *self.taps.back().unwrap();
        let avg_interval = (last - first) / (TAP_WINDOW - 1) as f64;
        Some(clamp_bpm((60_000.0 / avg_interval).round()))
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::pattern::{MAX_BPM, MIN_BPM};

    #[test]
    fn five_even_taps_give_the_tempo() {
        let mut tap = TapTempo::new();
        assert_eq!(tap.tap(0.0), None);
        assert_eq!(tap.tap(500.0), None);
        assert_eq!(tap.tap(1000.0), None);
        assert_eq!(tap.tap(1500.0), None);
        assert_eq!(tap.tap(2000.0), Some(120.0));
    }

    #[test]
    fn no_estimate_until_window_is_full() {
        let mut tap = TapTempo::new();
        for i in 0..TAP_WINDOW - 1 {
            assert_eq!(tap.tap(i as f64 * 400.0), None);
        }
    }

    #[test]
    fn long_pause_resets_the_window() {
        let mut tap = TapTempo::new();
        tap.tap(0.0);
        // Gap of 4000 ms > timeout: history is discarded.
        assert_eq!(tap.tap(4000.0), None);
        assert_eq!(tap.len(), 1);
        // Four more taps complete a fresh window.
        assert_eq!(tap.tap(4500.0), None);
        assert_eq!(tap.tap(5000.0), None);
        assert_eq!(tap.tap(5500.0), None);
        assert_eq!(tap.tap(6000.0), Some(120.0));
    }

    #[test]
    fn window_slides_over_the_latest_five() {
        let mut tap = TapTempo::new();
        for i in 0..5 {
            tap.tap(i as f64 * 500.0);
        }
        // Subsequent taps at a faster rate pull the average down as the
        // old taps slide out.
        let mut estimate = None;
        for i in 0..4 {
            estimate = tap.tap(2000.0 + (i + 1) as f64 * 250.0);
        }
        assert_eq!(tap.len(), TAP_WINDOW);
        assert_eq!(estimate, Some(240.0));
    }

    #[test]
    fn estimates_are_integers_in_the_clamp_range() {
        let mut tap = TapTempo::new();
        let mut estimate = None;
        // 333 ms intervals: 60000/333 = 180.18..., rounds to 180.
        for i in 0..5 {
            estimate = tap.tap(i as f64 * 333.0);
        }
        let bpm = estimate.unwrap();
        assert_eq!(bpm, 180.0);
        assert_eq!(bpm.fract(), 0.0);
        assert!((MIN_BPM..=MAX_BPM).contains(&bpm));
    }

    #[test]
    fn extreme_rates_clamp() {
        let mut fast = TapTempo::new();
        let mut estimate = None;
        for i in 0..5 {
            estimate = fast.tap(i as f64 * 100.0); // 600 BPM raw
        }
        assert_eq!(estimate, Some(MAX_BPM));

        let mut slow = TapTempo::new();
        let mut estimate = None;
        for i in 0..5 {
            estimate = slow.tap(i as f64 * 2500.0); // 24 BPM raw
        }
        assert_eq!(estimate, Some(MIN_BPM));
    }

    #[test]
    fn duplicate_timestamp_is_discarded() {
        let mut tap = TapTempo::new();
        tap.tap(0.0);
        assert_eq!(tap.tap(0.0), None);
        assert_eq!(tap.len(), 1);
        // The window still completes normally afterwards.
        tap.tap(500.0);
        tap.tap(1000.0);
        tap.tap(1500.0);
        assert_eq!(tap.tap(2000.0), Some(120.0));
    }
}
