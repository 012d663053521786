// Transport - Playback phase and session-scoped playback state
// Created on start, discarded on stop, advanced only by the scheduler

use super::sequence::SequenceConfig;

/// Offset between the start command and the first scheduled note (seconds)
pub const START_OFFSET: f64 = 0.05;

/// Far-future sentinel for `current_step_time` so nothing is painted
/// before the first step is actually scheduled (seconds)
pub const STEP_TIME_SENTINEL: f64 = 3600.0;

/// Transport phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    /// Lead-in clicks before the pattern proper
    CountingIn,
    /// Main pattern playback
    Running,
}

impl TransportState {
    /// Check if transport is in a playing state (CountingIn or Running)
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::CountingIn | TransportState::Running)
    }

    pub fn is_counting_in(&self) -> bool {
        matches!(self, TransportState::CountingIn)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped)
    }
}

impl Default for TransportState {
    fn default() -> Self {
        TransportState::Stopped
    }
}

/// State of one playback session
///
/// Only ever exists while playing, so its phase is never `Stopped`. The
/// controller owns it, the scheduler advances it and the visual loop reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// `CountingIn` or `Running`
    pub phase: TransportState,
    /// Next step of the main pattern to schedule, in `[0, grid_size)`
    pub current_step: usize,
    /// Count-in steps already scheduled
    pub count_in_step: usize,
    /// Position within the play/drop bar cycle
    pub current_bar_cycle: usize,
    /// Audio-clock time of the next unscheduled step
    pub next_note_time: f64,
    /// Audio-clock time (minus visual compensation) at which the displayed step starts
    pub current_step_time: f64,
    /// Step last painted by the visual loop
    pub last_step: Option<usize>,
}

impl PlaybackState {
    /// Fresh session starting at `now` on the audio clock.
    ///
    /// Counters start at 0 and the session counts in iff the config asks for it.
    pub fn begin(config: &SequenceConfig, now: f64) -> Self {
        let phase = if config.count_in_bars() > 0 {
            TransportState::CountingIn
        } else {
            TransportState::Running
        };

        Self {
            phase,
            current_step: 0,
            count_in_step: 0,
            current_bar_cycle: 0,
            next_note_time: now + START_OFFSET,
            current_step_time: now + STEP_TIME_SENTINEL,
            last_step: None,
        }
    }

    pub fn is_counting_in(&self) -> bool {
        self.phase.is_counting_in()
    }

    /// Step currently sounding: the scheduler has already moved past it
    pub fn previous_step(&self, grid_size: usize) -> usize {
        if self.current_step == 0 {
            grid_size.saturating_sub(1)
        } else {
            self.current_step - 1
        }
    }

    /// Leave the count-in and restart the pattern from its first step
    pub fn finish_count_in(&mut self) {
        self.phase = TransportState::Running;
        self.current_step = 0;
        self.current_bar_cycle = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::timeline::StepMode;

    #[test]
    fn test_transport_state() {
        assert!(TransportState::CountingIn.is_playing());
        assert!(TransportState::Running.is_playing());
        assert!(!TransportState::Stopped.is_playing());
        assert!(TransportState::Stopped.is_stopped());
        assert!(TransportState::CountingIn.is_counting_in());
        assert_eq!(TransportState::default(), TransportState::Stopped);
    }

    #[test]
    fn test_begin_without_count_in() {
        let config = SequenceConfig::new();
        let state = PlaybackState::begin(&config, 2.0);

        assert_eq!(state.phase, TransportState::Running);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.count_in_step, 0);
        assert_eq!(state.current_bar_cycle, 0);
        assert!((state.next_note_time - 2.05).abs() < 1e-12);
        assert!(state.current_step_time > 3600.0);
        assert_eq!(state.last_step, None);
    }

    #[test]
    fn test_begin_with_count_in() {
        let mut config = SequenceConfig::new();
        config.set_count_in(1);
        let state = PlaybackState::begin(&config, 0.0);
        assert!(state.is_counting_in());
    }

    #[test]
    fn test_previous_step_wraps() {
        let config = SequenceConfig::new();
        let mut state = PlaybackState::begin(&config, 0.0);
        let grid = StepMode::Sixteen.steps_per_bar();

        assert_eq!(state.previous_step(grid), 15);
        state.current_step = 5;
        assert_eq!(state.previous_step(grid), 4);
    }

    #[test]
    fn test_finish_count_in() {
        let mut config = SequenceConfig::new();
        config.set_count_in(2);
        let mut state = PlaybackState::begin(&config, 0.0);
        state.current_step = 7;
        state.current_bar_cycle = 1;

        state.finish_count_in();
        assert_eq!(state.phase, TransportState::Running);
        assert_eq!(state.current_step, 0);
        assert_eq!(state.current_bar_cycle, 0);
    }
}
