// Pattern - The step grid of accent levels
// One cell per step, each cell is off or one of three accent levels

use crate::sequencer::timeline::StepMode;

/// Accent level of one grid cell, weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum AccentLevel {
    /// Cell is silent
    #[default]
    Off = 0,
    /// Plays the `state1` profile
    Weak = 1,
    /// Plays the `state2` profile
    Medium = 2,
    /// Plays the `state3` profile
    Strong = 3,
}

impl AccentLevel {
    /// Convert a raw cell value (0..=3)
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AccentLevel::Off),
            1 => Some(AccentLevel::Weak),
            2 => Some(AccentLevel::Medium),
            3 => Some(AccentLevel::Strong),
            _ => None,
        }
    }

    /// Raw cell value (0..=3)
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Next value when a cell is clicked: 3 → 2 → 1 → 0 → 3
    pub fn next_in_cycle(self) -> Self {
        match self {
            AccentLevel::Strong => AccentLevel::Medium,
            AccentLevel::Medium => AccentLevel::Weak,
            AccentLevel::Weak => AccentLevel::Off,
            AccentLevel::Off => AccentLevel::Strong,
        }
    }

    pub fn is_off(self) -> bool {
        self == AccentLevel::Off
    }
}

/// A bar of accent cells
///
/// The length always matches the mode the pattern was built for; the owning
/// [`SequenceConfig`](crate::sequencer::sequence::SequenceConfig) rebuilds it
/// whenever the mode changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    cells: Vec<AccentLevel>,
}

impl Pattern {
    /// Create a silent pattern for the given mode
    pub fn empty(mode: StepMode) -> Self {
        Self {
            cells: vec![AccentLevel::Off; mode.steps_per_bar()],
        }
    }

    /// Built-in layout: strongest accent on every beat, everything else off.
    ///
    /// 16 steps → cells 0, 4, 8, 12. 12 steps → cells 0, 3, 6, 9.
    pub fn default_for(mode: StepMode) -> Self {
        let mut pattern = Self::empty(mode);
        let beat = mode.steps_per_beat();
        for cell in pattern.cells.iter_mut().step_by(beat) {
            *cell = AccentLevel::Strong;
        }
        pattern
    }

    /// Number of cells (always equals the mode's steps per bar)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Accent at `index`, `None` when out of range
    pub fn get(&self, index: usize) -> Option<AccentLevel> {
        self.cells.get(index).copied()
    }

    /// All cells in step order
    pub fn cells(&self) -> &[AccentLevel] {
        &self.cells
    }

    /// Overwrite one cell. Returns false when `index` is out of range.
    pub fn set(&mut self, index: usize, level: AccentLevel) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = level;
                true
            }
            None => false,
        }
    }

    /// Advance one cell round-robin (3 → 2 → 1 → 0 → 3) and return its new value
    pub fn cycle_step(&mut self, index: usize) -> Option<AccentLevel> {
        let cell = self.cells.get_mut(index)?;
        *cell = cell.next_in_cycle();
        Some(*cell)
    }

    /// Turn every cell off
    pub fn clear(&mut self) {
        self.cells.fill(AccentLevel::Off);
    }

    /// Number of cells that will produce a sound
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_off()).count()
    }
}
