// Tap tempo - Tempo from the average interval between taps

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of most recent taps averaged
pub const MAX_TAP_TIMES: usize = 4;

/// A longer pause starts a new tap sequence
pub const TAP_RESET_GAP: Duration = Duration::from_millis(2000);

/// Result of one tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapResult {
    /// The previous sequence was discarded before this tap
    pub reset: bool,
    /// Taps in the current sequence, this one included
    pub taps: usize,
    /// Unclamped tempo, once at least two taps are known
    pub bpm: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct TapTempo {
    taps: VecDeque<Instant>,
}

impl TapTempo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tap(&mut self) -> TapResult {
        self.tap_at(Instant::now())
    }

    /// Register a tap at `now`
    pub fn tap_at(&mut self, now: Instant) -> TapResult {
        let reset = match self.taps.back() {
            Some(&last) => now.saturating_duration_since(last) > TAP_RESET_GAP,
            None => false,
        };
        if reset {
            self.taps.clear();
        }

        self.taps.push_back(now);
        if self.taps.len() > MAX_TAP_TIMES {
            self.taps.pop_front();
        }

        TapResult {
            reset,
            taps: self.taps.len(),
            bpm: self.bpm(),
        }
    }

    /// `round(60000 / mean interval in ms)` over the stored taps
    pub fn bpm(&self) -> Option<i32> {
        let (first, last) = (self.taps.front()?, self.taps.back()?);
        let intervals = self.taps.len().checked_sub(1).filter(|&n| n > 0)?;

        // Consecutive intervals telescope to last - first
        let total_ms = last.saturating_duration_since(*first).as_secs_f64() * 1000.0;
        let average_ms = total_ms / intervals as f64;
        if average_ms <= 0.0 {
            return None;
        }
        Some((60_000.0 / average_ms).round() as i32)
    }

    pub fn clear(&mut self) {
        self.taps.clear();
    }

    pub fn tap_count(&self) -> usize {
        self.taps.len()
    }
}
