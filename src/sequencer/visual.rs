// Visual sync - Step highlighting that follows the audio clock
//
// Called once per display frame. It only reads scheduler state (plus the
// `last_step` bookkeeping) and never influences audio timing.

use crate::sequencer::sequence::SequenceConfig;
use crate::sequencer::transport::PlaybackState;

/// How one grid cell should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepVisual {
    #[default]
    None,
    /// Currently sounding step
    Playing,
    /// Current step of a dropped bar
    SilentPlaying,
}

/// Whether the frame callback should run again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Reschedule,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Highlight {
    step: usize,
    silent: bool,
}

/// Frame-driven highlight state
#[derive(Debug, Clone, Default)]
pub struct VisualSync {
    running: bool,
    highlight: Option<Highlight>,
}

impl VisualSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
        self.highlight = None;
    }

    /// The next frame exits. Highlighting is cleared.
    pub fn stop(&mut self) {
        self.running = false;
        self.highlight = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// One display frame at audio time `now`.
    pub fn frame(
        &mut self,
        now: f64,
        config: &SequenceConfig,
        state: Option<&mut PlaybackState>,
    ) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Exit;
        }
        let Some(state) = state else {
            return FrameOutcome::Reschedule;
        };

        if now >= state.current_step_time {
            if state.last_step != Some(state.current_step) {
                self.paint(config, state);
                state.last_step = Some(state.current_step);
            }
        } else if state.is_counting_in() {
            // Keep count-in highlights from bleeding into the pattern
            self.highlight = None;
            state.last_step = None;
        }

        FrameOutcome::Reschedule
    }

    fn paint(&mut self, config: &SequenceConfig, state: &PlaybackState) {
        if state.is_counting_in() {
            self.highlight = None;
            return;
        }

        let grid = config.grid_size();
        let cycle = config.bar_cycle();
        // The scheduler has already moved past the sounding step
        let visual_step = state.previous_step(grid);

        // Only the last step of a bar is corrected back to its own bar
        let cycle_len = cycle.len();
        let mut bar_index = state.current_bar_cycle;
        if visual_step == grid - 1 && cycle_len > 0 {
            bar_index = (state.current_bar_cycle + cycle_len - 1) % cycle_len;
        }

        self.highlight = Some(Highlight {
            step: visual_step,
            silent: cycle.is_dropped(bar_index),
        });
    }

    /// Drawing state of one grid cell
    pub fn step_visual(&self, step: usize) -> StepVisual {
        match self.highlight {
            Some(Highlight { step: lit, silent }) if lit == step => {
                if silent {
                    StepVisual::SilentPlaying
                } else {
                    StepVisual::Playing
                }
            }
            _ => StepVisual::None,
        }
    }

    /// Step currently lit, if any
    pub fn highlighted_step(&self) -> Option<usize> {
        self.highlight.map(|h| h.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::transport::TransportState;

    fn running_state(config: &SequenceConfig) -> PlaybackState {
        let mut state = PlaybackState::begin(config, 0.0);
        state.phase = TransportState::Running;
        state
    }

    #[test]
    fn test_stopped_loop_exits() {
        let config = SequenceConfig::new();
        let mut visual = VisualSync::new();
        assert_eq!(visual.frame(0.0, &config, None), FrameOutcome::Exit);
    }

    #[test]
    fn test_nothing_painted_before_threshold() {
        let config = SequenceConfig::new();
        let mut state = running_state(&config);
        let mut visual = VisualSync::new();
        visual.start();

        // current_step_time is still the far-future sentinel
        assert_eq!(visual.frame(1.0, &config, Some(&mut state)), FrameOutcome::Reschedule);
        assert_eq!(visual.highlighted_step(), None);
        assert_eq!(state.last_step, None);
    }

    #[test]
    fn test_paints_previous_step() {
        let config = SequenceConfig::new();
        let mut state = running_state(&config);
        state.current_step = 5;
        state.current_step_time = 1.0;

        let mut visual = VisualSync::new();
        visual.start();
        visual.frame(1.0, &config, Some(&mut state));

        assert_eq!(visual.highlighted_step(), Some(4));
        assert_eq!(visual.step_visual(4), StepVisual::Playing);
        assert_eq!(visual.step_visual(5), StepVisual::None);
        assert_eq!(state.last_step, Some(5));
    }

    #[test]
    fn test_same_step_not_repainted() {
        let config = SequenceConfig::new();
        let mut state = running_state(&config);
        state.current_step = 3;
        state.current_step_time = 0.5;

        let mut visual = VisualSync::new();
        visual.start();
        visual.frame(1.0, &config, Some(&mut state));
        assert_eq!(visual.highlighted_step(), Some(2));

        // Manually clear, the next frame must not repaint the same step
        visual.highlight = None;
        visual.frame(1.1, &config, Some(&mut state));
        assert_eq!(visual.highlighted_step(), None);
    }

    #[test]
    fn test_last_step_of_dropped_bar_uses_previous_bar() {
        let mut config = SequenceConfig::new();
        config.set_bars_to_play(1);
        config.set_bars_to_drop(1);

        let mut state = running_state(&config);
        state.current_step_time = 0.0;

        // Step 15 of bar 1 (dropped) just sounded; the bar counter already wrapped to 0
        state.current_step = 0;
        state.current_bar_cycle = 0;
        let mut visual = VisualSync::new();
        visual.start();
        visual.frame(1.0, &config, Some(&mut state));
        assert_eq!(visual.step_visual(15), StepVisual::SilentPlaying);

        // Step 15 of bar 0 (audible) just sounded; counter is now 1
        state.current_bar_cycle = 1;
        state.last_step = None;
        visual.frame(1.0, &config, Some(&mut state));
        assert_eq!(visual.step_visual(15), StepVisual::Playing);
    }

    #[test]
    fn test_mid_bar_step_uses_current_bar() {
        let mut config = SequenceConfig::new();
        config.set_bars_to_play(1);
        config.set_bars_to_drop(1);

        let mut state = running_state(&config);
        state.current_step_time = 0.0;
        state.current_step = 7;
        state.current_bar_cycle = 1;

        let mut visual = VisualSync::new();
        visual.start();
        visual.frame(1.0, &config, Some(&mut state));
        assert_eq!(visual.step_visual(6), StepVisual::SilentPlaying);
    }

    #[test]
    fn test_count_in_clears_highlight() {
        let mut config = SequenceConfig::new();
        config.set_count_in(1);
        let mut state = PlaybackState::begin(&config, 0.0);
        let mut visual = VisualSync::new();
        visual.start();
        visual.highlight = Some(Highlight { step: 3, silent: false });

        // Before the threshold while counting in: cleared and reset
        state.last_step = Some(2);
        visual.frame(0.0, &config, Some(&mut state));
        assert_eq!(visual.highlighted_step(), None);
        assert_eq!(state.last_step, None);

        // Past the threshold while counting in: still nothing lit
        state.current_step_time = 0.0;
        visual.frame(0.1, &config, Some(&mut state));
        assert_eq!(visual.highlighted_step(), None);
        assert_eq!(state.last_step, Some(0));
    }

    #[test]
    fn test_stop_clears() {
        let config = SequenceConfig::new();
        let mut state = running_state(&config);
        state.current_step = 1;
        state.current_step_time = 0.0;

        let mut visual = VisualSync::new();
        visual.start();
        visual.frame(0.5, &config, Some(&mut state));
        assert!(visual.highlighted_step().is_some());

        visual.stop();
        assert!(!visual.is_running());
        assert_eq!(visual.step_visual(0), StepVisual::None);
        assert_eq!(visual.frame(0.6, &config, Some(&mut state)), FrameOutcome::Exit);
    }
}
