// Scheduler - Look-ahead note scheduling against the audio clock
//
// Each tick fills a short window ahead of the audio clock with step events.
// Note times are accumulated from the previous note time, never from the
// tick time, so a late or jittery tick cannot shift the grid.

use crate::audio::trigger::SoundTrigger;
use crate::settings::types::AccentProfiles;
use crate::sequencer::sequence::SequenceConfig;
use crate::sequencer::timeline::{StepMode, VISUAL_LATENCY_MS, visual_compensation_ms};
use crate::sequencer::transport::{PlaybackState, TransportState};

/// How far ahead of the audio clock notes are committed (seconds)
pub const SCHEDULE_AHEAD_TIME: f64 = 0.1;

/// What one fill pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    /// Steps (audible or not) the window advanced over
    pub steps_scheduled: usize,
    /// Clicks actually handed to the sound trigger
    pub sounds_triggered: usize,
    /// The session left the count-in during this pass
    pub count_in_finished: bool,
}

/// Whether count-in step `step` clicks.
///
/// Two bars: the first bar pulses in half notes, the second in quarter notes.
/// One bar: quarter notes throughout.
pub fn count_in_clicks(mode: StepMode, count_in_bars: u8, step: usize) -> bool {
    let grid = mode.steps_per_bar();
    let beat = mode.steps_per_beat();

    match count_in_bars {
        2 if step < grid => step == 0 || step == grid / 2,
        2 | 1 => step % beat == 0,
        _ => false,
    }
}

/// The look-ahead scheduler
///
/// Holds no session state of its own: the caller passes the config it reads
/// and the playback state it advances.
#[derive(Debug, Clone, Copy)]
pub struct LookAheadScheduler {
    schedule_ahead_time: f64,
}

impl LookAheadScheduler {
    pub fn new() -> Self {
        Self {
            schedule_ahead_time: SCHEDULE_AHEAD_TIME,
        }
    }

    /// Scheduler with a custom look-ahead window (seconds)
    pub fn with_window(schedule_ahead_time: f64) -> Self {
        Self {
            schedule_ahead_time: schedule_ahead_time.max(0.0),
        }
    }

    /// Schedule every step whose time falls before `now + window`.
    pub fn fill<T: SoundTrigger + ?Sized>(
        &self,
        now: f64,
        config: &SequenceConfig,
        profiles: &AccentProfiles,
        state: &mut PlaybackState,
        trigger: &mut T,
    ) -> FillReport {
        let mut report = FillReport::default();
        let horizon = now + self.schedule_ahead_time;

        while state.next_note_time < horizon {
            let time = state.next_note_time;

            let played = match state.phase {
                TransportState::CountingIn => {
                    let (played, finished) =
                        Self::schedule_count_in_step(time, config, profiles, state, trigger);
                    report.count_in_finished |= finished;
                    played
                }
                TransportState::Running => {
                    Self::schedule_pattern_step(time, config, profiles, state, trigger)
                }
                TransportState::Stopped => break,
            };

            if played {
                report.sounds_triggered += 1;
            }
            report.steps_scheduled += 1;
            state.next_note_time += config.seconds_per_step();
        }

        report
    }

    /// Returns (clicked, count-in finished)
    fn schedule_count_in_step<T: SoundTrigger + ?Sized>(
        time: f64,
        config: &SequenceConfig,
        profiles: &AccentProfiles,
        state: &mut PlaybackState,
        trigger: &mut T,
    ) -> (bool, bool) {
        let clicked = count_in_clicks(config.mode(), config.count_in_bars(), state.count_in_step);
        if clicked {
            trigger.trigger(time, profiles.count_in());
            state.current_step_time = time - VISUAL_LATENCY_MS / 1000.0;
        }

        state.count_in_step += 1;

        // `>=` so a count-in shortened mid-session still terminates
        let finished = state.count_in_step >= config.count_in_steps();
        if finished {
            state.finish_count_in();
        }

        (clicked, finished)
    }

    /// Returns whether a sound was triggered
    fn schedule_pattern_step<T: SoundTrigger + ?Sized>(
        time: f64,
        config: &SequenceConfig,
        profiles: &AccentProfiles,
        state: &mut PlaybackState,
        trigger: &mut T,
    ) -> bool {
        let grid = config.grid_size();
        let cycle = config.bar_cycle();

        // Mode changes stop playback, but never index past the grid
        let step = state.current_step % grid;
        let dropped = cycle.is_dropped(state.current_bar_cycle);

        let step_ms = config.seconds_per_step() * 1000.0;
        state.current_step_time = time - visual_compensation_ms(step_ms) / 1000.0;

        let mut played = false;
        if !dropped {
            let level = config.pattern().get(step).unwrap_or_default();
            if let Some(profile) = profiles.for_level(level) {
                trigger.trigger(time, profile);
                played = true;
            }
        }

        state.current_step = (step + 1) % grid;
        if step == grid - 1 {
            state.current_bar_cycle = cycle.next_bar(state.current_bar_cycle);
        }

        played
    }
}

impl Default for LookAheadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::trigger::RecordingTrigger;
    use crate::sequencer::pattern::AccentLevel;

    const EPSILON: f64 = 1e-9;

    fn clicks(mode: StepMode, bars: u8) -> Vec<usize> {
        (0..mode.steps_per_bar() * bars as usize)
            .filter(|&step| count_in_clicks(mode, bars, step))
            .collect()
    }

    #[test]
    fn test_count_in_table_sixteen() {
        assert_eq!(clicks(StepMode::Sixteen, 1), vec![0, 4, 8, 12]);
        assert_eq!(clicks(StepMode::Sixteen, 2), vec![0, 8, 16, 20, 24, 28]);
    }

    #[test]
    fn test_count_in_table_twelve() {
        assert_eq!(clicks(StepMode::Twelve, 1), vec![0, 3, 6, 9]);
        assert_eq!(clicks(StepMode::Twelve, 2), vec![0, 6, 12, 15, 18, 21]);
    }

    #[test]
    fn test_fill_respects_window() {
        let config = SequenceConfig::new();
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();
        let scheduler = LookAheadScheduler::new();

        // First note at 0.05, window ends at 0.1: only that note fits
        let report = scheduler.fill(0.0, &config, &profiles, &mut state, &mut trigger);
        assert_eq!(report.steps_scheduled, 1);
        assert_eq!(report.sounds_triggered, 1);
        assert!((state.next_note_time - 0.175).abs() < EPSILON);

        // Nothing new until the window moves
        let report = scheduler.fill(0.0, &config, &profiles, &mut state, &mut trigger);
        assert_eq!(report.steps_scheduled, 0);

        let report = scheduler.fill(0.5, &config, &profiles, &mut state, &mut trigger);
        // 0.175, 0.3, 0.425, 0.55 < 0.6
        assert_eq!(report.steps_scheduled, 4);
    }

    #[test]
    fn test_default_pattern_plays_beats() {
        let config = SequenceConfig::new();
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();

        // 16 steps at 0.125s starting at 0.05
        LookAheadScheduler::new().fill(1.9, &config, &profiles, &mut state, &mut trigger);

        let times: Vec<f64> = trigger.events().iter().map(|e| e.start_time).collect();
        assert_eq!(times.len(), 4);
        for (i, time) in times.iter().enumerate() {
            assert!((time - (0.05 + i as f64 * 0.5)).abs() < EPSILON);
        }
        assert!(trigger.events().iter().all(|e| e.frequency == 880.0));
        assert_eq!(state.current_step, 0);
        assert_eq!(state.current_bar_cycle, 0);
    }

    #[test]
    fn test_accent_levels_pick_profiles() {
        let mut config = SequenceConfig::new();
        config.clear_pattern();
        config.set_pattern_cell(0, AccentLevel::Weak);
        config.set_pattern_cell(1, AccentLevel::Medium);
        config.set_pattern_cell(2, AccentLevel::Strong);

        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();
        LookAheadScheduler::new().fill(0.4, &config, &profiles, &mut state, &mut trigger);

        let freqs: Vec<f32> = trigger.events().iter().map(|e| e.frequency).collect();
        assert_eq!(freqs, vec![220.0, 440.0, 880.0]);
    }

    #[test]
    fn test_step_time_recorded_with_compensation() {
        let config = SequenceConfig::new();
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();

        LookAheadScheduler::new().fill(0.0, &config, &profiles, &mut state, &mut trigger);
        // 125ms steps are slow: compensation is min(12.5, 15) = 12.5ms
        assert!((state.current_step_time - (0.05 - 0.0125)).abs() < EPSILON);
    }

    #[test]
    fn test_count_in_transition() {
        let mut config = SequenceConfig::new();
        config.set_count_in(1);
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();
        let scheduler = LookAheadScheduler::new();

        // 15 count-in steps: still counting
        let report = scheduler.fill(
            0.05 + 14.0 * 0.125 - 0.05,
            &config,
            &profiles,
            &mut state,
            &mut trigger,
        );
        assert_eq!(report.steps_scheduled, 15);
        assert!(!report.count_in_finished);
        assert!(state.is_counting_in());

        // The 16th finishes the count-in
        let report = scheduler.fill(1.85, &config, &profiles, &mut state, &mut trigger);
        assert!(report.count_in_finished);
        assert_eq!(state.phase, TransportState::Running);
        assert_eq!(state.count_in_step, 16);

        // Count-in clicks are all on the strongest profile, every beat
        let events = trigger.events();
        assert!(events.len() >= 4);
        assert!(events[..4].iter().all(|e| e.frequency == 880.0));
    }

    #[test]
    fn test_dropped_bars_are_silent_but_advance() {
        let mut config = SequenceConfig::new();
        config.set_bars_to_play(1);
        config.set_bars_to_drop(1);
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();

        // Three bars: play, drop, play
        let bar = 16.0 * 0.125;
        LookAheadScheduler::new().fill(3.0 * bar - 0.1, &config, &profiles, &mut state, &mut trigger);

        let events = trigger.events();
        assert_eq!(events.len(), 8);
        assert!(events[..4].iter().all(|e| e.start_time < bar + 0.05));
        assert!(events[4..].iter().all(|e| e.start_time >= 2.0 * bar));
        assert_eq!(state.current_bar_cycle, 1);
    }

    #[test]
    fn test_empty_cycle_never_drops() {
        let mut config = SequenceConfig::new();
        config.set_bars_to_play(0);
        config.set_bars_to_drop(0);
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();

        LookAheadScheduler::new().fill(4.0, &config, &profiles, &mut state, &mut trigger);
        assert!(trigger.len() >= 8);
        assert_eq!(state.current_bar_cycle, 0);
    }

    #[test]
    fn test_zero_window_schedules_overdue_only() {
        let config = SequenceConfig::new();
        let profiles = AccentProfiles::factory();
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut trigger = RecordingTrigger::new();
        let scheduler = LookAheadScheduler::with_window(0.0);

        assert_eq!(
            scheduler
                .fill(0.0, &config, &profiles, &mut state, &mut trigger)
                .steps_scheduled,
            0
        );
        assert_eq!(
            scheduler
                .fill(0.06, &config, &profiles, &mut state, &mut trigger)
                .steps_scheduled,
            1
        );
    }
}
