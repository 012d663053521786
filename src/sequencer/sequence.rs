// Sequence configuration - Long-lived settings read by the scheduler
// Mode, pattern, tempo, play/drop bar cycle and count-in

use crate::sequencer::pattern::{AccentLevel, Pattern};
use crate::sequencer::timeline::{StepMode, Tempo};

/// Maximum number of bars for either side of the play/drop cycle
pub const MAX_BARS_TO_CYCLE: u8 = 8;

/// Maximum number of count-in bars
pub const MAX_COUNT_IN_BARS: u8 = 2;

/// Repeating cycle of audible bars followed by silent ("dropped") bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarCycle {
    bars_to_play: u8,
    bars_to_drop: u8,
}

impl BarCycle {
    /// Create a cycle, each side clamped to [0, 8]
    pub fn new(bars_to_play: u8, bars_to_drop: u8) -> Self {
        Self {
            bars_to_play: bars_to_play.min(MAX_BARS_TO_CYCLE),
            bars_to_drop: bars_to_drop.min(MAX_BARS_TO_CYCLE),
        }
    }

    pub fn bars_to_play(&self) -> u8 {
        self.bars_to_play
    }

    pub fn bars_to_drop(&self) -> u8 {
        self.bars_to_drop
    }

    /// `bars_to_play + bars_to_drop`
    pub fn len(&self) -> usize {
        self.bars_to_play as usize + self.bars_to_drop as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A bar index at or past `bars_to_play` within a non-empty cycle is silent
    pub fn is_dropped(&self, bar_index: usize) -> bool {
        !self.is_empty() && bar_index >= self.bars_to_play as usize
    }

    /// Bar index following `bar_index`, wrapping at the cycle length.
    /// An empty cycle stays at 0.
    pub fn next_bar(&self, bar_index: usize) -> usize {
        match self.len() {
            0 => 0,
            len => (bar_index + 1) % len,
        }
    }
}

impl Default for BarCycle {
    fn default() -> Self {
        Self {
            bars_to_play: 1,
            bars_to_drop: 0,
        }
    }
}

/// Everything the user edits between (and during) sessions
///
/// The grid size is derived from `mode`, so it can never disagree with it, and
/// the pattern is rebuilt whenever the mode changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceConfig {
    mode: StepMode,
    pattern: Pattern,
    tempo: Tempo,
    bar_cycle: BarCycle,
    count_in_bars: u8,
}

impl SequenceConfig {
    pub fn new() -> Self {
        let mode = StepMode::default();
        Self {
            mode,
            pattern: Pattern::default_for(mode),
            tempo: Tempo::default(),
            bar_cycle: BarCycle::default(),
            count_in_bars: 0,
        }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Steps per bar, always equal to the mode
    pub fn grid_size(&self) -> usize {
        self.mode.steps_per_bar()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn bar_cycle(&self) -> BarCycle {
        self.bar_cycle
    }

    pub fn count_in_bars(&self) -> u8 {
        self.count_in_bars
    }

    /// Total number of steps in the count-in (`grid_size * count_in_bars`)
    pub fn count_in_steps(&self) -> usize {
        self.grid_size() * self.count_in_bars as usize
    }

    /// Seconds between two consecutive steps at the current tempo and mode
    pub fn seconds_per_step(&self) -> f64 {
        self.tempo.step_duration_seconds(self.mode)
    }

    // ---- Mode / pattern ----

    /// Switch mode. Returns false (and changes nothing) when the mode is unchanged,
    /// otherwise the pattern is reset to the default layout of the new mode.
    pub fn set_mode(&mut self, mode: StepMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        self.pattern = Pattern::default_for(mode);
        true
    }

    /// Cycle one cell 3 → 2 → 1 → 0 → 3, returns the new value
    pub fn set_pattern_step(&mut self, index: usize) -> Option<AccentLevel> {
        self.pattern.cycle_step(index)
    }

    /// Overwrite one cell directly
    pub fn set_pattern_cell(&mut self, index: usize, level: AccentLevel) -> bool {
        self.pattern.set(index, level)
    }

    pub fn clear_pattern(&mut self) {
        self.pattern.clear();
    }

    /// Restore the built-in layout for the current mode
    pub fn reset_pattern(&mut self) {
        self.pattern = Pattern::default_for(self.mode);
    }

    // ---- Tempo ----

    /// Set the tempo (clamped to [30, 300]), returns the stored value
    pub fn set_tempo(&mut self, bpm: i32) -> u16 {
        self.tempo.set_bpm(bpm)
    }

    /// Add `delta` then clamp, returns the stored value
    pub fn adjust_tempo(&mut self, delta: i32) -> u16 {
        self.tempo.adjust(delta)
    }

    // ---- Bar cycle ----
    //
    // Every mutator returns whether the cycle actually changed so the caller
    // can restart the live bar counter.

    pub fn increase_play_bars(&mut self) -> bool {
        if self.bar_cycle.bars_to_play >= MAX_BARS_TO_CYCLE {
            return false;
        }
        self.bar_cycle.bars_to_play += 1;
        true
    }

    /// Back to a single audible bar
    pub fn reset_play_bars(&mut self) -> bool {
        self.replace_bar_cycle(BarCycle::new(1, self.bar_cycle.bars_to_drop))
    }

    pub fn increase_drop_bars(&mut self) -> bool {
        if self.bar_cycle.bars_to_drop >= MAX_BARS_TO_CYCLE {
            return false;
        }
        self.bar_cycle.bars_to_drop += 1;
        true
    }

    /// Back to no silent bars
    pub fn reset_drop_bars(&mut self) -> bool {
        self.replace_bar_cycle(BarCycle::new(self.bar_cycle.bars_to_play, 0))
    }

    /// Set the audible bar count directly, clamped to [0, 8]
    pub fn set_bars_to_play(&mut self, bars: u8) -> bool {
        self.replace_bar_cycle(BarCycle::new(bars, self.bar_cycle.bars_to_drop))
    }

    /// Set the silent bar count directly, clamped to [0, 8]
    pub fn set_bars_to_drop(&mut self, bars: u8) -> bool {
        self.replace_bar_cycle(BarCycle::new(self.bar_cycle.bars_to_play, bars))
    }

    fn replace_bar_cycle(&mut self, cycle: BarCycle) -> bool {
        if cycle == self.bar_cycle {
            return false;
        }
        self.bar_cycle = cycle;
        true
    }

    // ---- Count-in ----

    /// Advance the count-in 0 → 1 → 2 → 0, returns the new value
    pub fn cycle_count_in(&mut self) -> u8 {
        self.count_in_bars = (self.count_in_bars + 1) % (MAX_COUNT_IN_BARS + 1);
        self.count_in_bars
    }

    /// Set the count-in directly, clamped to [0, 2]
    pub fn set_count_in(&mut self, bars: u8) -> u8 {
        self.count_in_bars = bars.min(MAX_COUNT_IN_BARS);
        self.count_in_bars
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SequenceConfig::new();
        assert_eq!(config.mode(), StepMode::Sixteen);
        assert_eq!(config.grid_size(), 16);
        assert_eq!(config.pattern().len(), 16);
        assert_eq!(config.tempo().bpm(), 120);
        assert_eq!(config.bar_cycle(), BarCycle::new(1, 0));
        assert_eq!(config.count_in_bars(), 0);
    }

    #[test]
    fn test_set_mode_same_is_noop() {
        let mut config = SequenceConfig::new();
        config.set_pattern_step(1);
        let before = config.pattern().clone();

        assert!(!config.set_mode(StepMode::Sixteen));
        assert_eq!(config.pattern(), &before);
    }

    #[test]
    fn test_set_mode_resets_pattern() {
        let mut config = SequenceConfig::new();
        config.clear_pattern();

        assert!(config.set_mode(StepMode::Twelve));
        assert_eq!(config.grid_size(), 12);
        assert_eq!(config.pattern(), &Pattern::default_for(StepMode::Twelve));
        for (i, cell) in config.pattern().cells().iter().enumerate() {
            let expected = if [0, 3, 6, 9].contains(&i) {
                AccentLevel::Strong
            } else {
                AccentLevel::Off
            };
            assert_eq!(*cell, expected, "cell {}", i);
        }
    }

    #[test]
    fn test_grid_size_tracks_mode() {
        let mut config = SequenceConfig::new();
        for mode in [StepMode::Twelve, StepMode::Sixteen, StepMode::Twelve] {
            config.set_mode(mode);
            assert_eq!(config.grid_size(), mode.steps_per_bar());
            assert_eq!(config.pattern().len(), config.grid_size());
        }
    }

    #[test]
    fn test_tempo_mutators_clamp() {
        let mut config = SequenceConfig::new();
        assert_eq!(config.set_tempo(20), 30);
        assert_eq!(config.adjust_tempo(-5), 30);
        assert_eq!(config.set_tempo(299), 299);
        assert_eq!(config.adjust_tempo(5), 300);
        assert_eq!(config.adjust_tempo(i32::MAX), 300);
        assert_eq!(config.adjust_tempo(i32::MIN), 30);
    }

    #[test]
    fn test_play_bars_bounds() {
        let mut config = SequenceConfig::new();
        for _ in 0..20 {
            config.increase_play_bars();
        }
        assert_eq!(config.bar_cycle().bars_to_play(), MAX_BARS_TO_CYCLE);
        assert!(!config.increase_play_bars());

        assert!(config.reset_play_bars());
        assert_eq!(config.bar_cycle().bars_to_play(), 1);
        assert!(!config.reset_play_bars());
    }

    #[test]
    fn test_drop_bars_bounds() {
        let mut config = SequenceConfig::new();
        assert!(config.increase_drop_bars());
        assert!(config.increase_drop_bars());
        assert_eq!(config.bar_cycle().bars_to_drop(), 2);

        assert!(config.set_bars_to_drop(50));
        assert_eq!(config.bar_cycle().bars_to_drop(), MAX_BARS_TO_CYCLE);

        assert!(config.reset_drop_bars());
        assert_eq!(config.bar_cycle().bars_to_drop(), 0);
    }

    #[test]
    fn test_bar_cycle_drop_detection() {
        let cycle = BarCycle::new(2, 1);
        assert_eq!(cycle.len(), 3);
        assert!(!cycle.is_dropped(0));
        assert!(!cycle.is_dropped(1));
        assert!(cycle.is_dropped(2));

        assert_eq!(cycle.next_bar(0), 1);
        assert_eq!(cycle.next_bar(1), 2);
        assert_eq!(cycle.next_bar(2), 0);
    }

    #[test]
    fn test_empty_bar_cycle_never_drops() {
        let cycle = BarCycle::new(0, 0);
        assert!(cycle.is_empty());
        assert!(!cycle.is_dropped(0));
        assert!(!cycle.is_dropped(5));
        assert_eq!(cycle.next_bar(3), 0);
    }

    #[test]
    fn test_count_in_cycles() {
        let mut config = SequenceConfig::new();
        assert_eq!(config.cycle_count_in(), 1);
        assert_eq!(config.cycle_count_in(), 2);
        assert_eq!(config.cycle_count_in(), 0);

        assert_eq!(config.set_count_in(7), 2);
        assert_eq!(config.count_in_steps(), 32);

        config.set_mode(StepMode::Twelve);
        assert_eq!(config.count_in_steps(), 24);
    }
}
