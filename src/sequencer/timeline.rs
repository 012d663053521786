// Timeline - Musical time for the step grid
// Handles tempo, steps-per-bar modes and the conversion from steps to seconds

use std::fmt;

/// Slowest tempo the metronome accepts
pub const MIN_BPM: u16 = 30;

/// Fastest tempo the metronome accepts
pub const MAX_BPM: u16 = 300;

/// Tempo used on first launch
pub const DEFAULT_BPM: u16 = 120;

/// Base visual latency compensation in milliseconds.
/// 50ms is the value that still keeps the highlight in sync at 300 BPM.
pub const VISUAL_LATENCY_MS: f64 = 50.0;

/// Above this step duration the compensation shrinks proportionally
const SLOW_STEP_THRESHOLD_MS: f64 = 100.0;

/// Upper bound of the shrunken compensation at slow tempos
const SLOW_STEP_MAX_COMPENSATION_MS: f64 = 15.0;

/// Steps per bar. Determines how a beat (quarter note) is subdivided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StepMode {
    /// 16 steps per bar, the beat is split into sixteenth notes
    Sixteen,
    /// 12 steps per bar, the beat is split into triplets
    Twelve,
}

impl StepMode {
    /// Number of grid cells in one bar
    pub fn steps_per_bar(self) -> usize {
        match self {
            StepMode::Sixteen => 16,
            StepMode::Twelve => 12,
        }
    }

    /// Number of steps that make up one beat (4 for sixteenths, 3 for triplets)
    pub fn steps_per_beat(self) -> usize {
        self.steps_per_bar() / 4
    }

    /// Divisor applied to the beat duration: `mode / 4`
    pub fn beat_subdivision(self) -> f64 {
        self.steps_per_bar() as f64 / 4.0
    }
}

impl Default for StepMode {
    fn default() -> Self {
        StepMode::Sixteen
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-step", self.steps_per_bar())
    }
}

/// Tempo in BPM (Beats Per Minute)
///
/// Always within [`MIN_BPM`, `MAX_BPM`]: every constructor and mutator clamps,
/// out-of-range requests are never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tempo {
    bpm: u16,
}

impl Tempo {
    /// Creates a new tempo, clamped to the supported range
    pub fn new(bpm: i32) -> Self {
        Self {
            bpm: clamp_bpm(bpm),
        }
    }

    /// Get BPM value
    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Set BPM value (clamped), returns the value actually stored
    pub fn set_bpm(&mut self, bpm: i32) -> u16 {
        self.bpm = clamp_bpm(bpm);
        self.bpm
    }

    /// Add `delta` BPM then clamp
    pub fn adjust(&mut self, delta: i32) -> u16 {
        self.set_bpm((self.bpm as i32).saturating_add(delta))
    }

    /// Duration of one grid step in seconds for the given mode
    pub fn step_duration_seconds(&self, mode: StepMode) -> f64 {
        seconds_per_step(self.bpm, mode)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: DEFAULT_BPM }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}

fn clamp_bpm(bpm: i32) -> u16 {
    bpm.clamp(MIN_BPM as i32, MAX_BPM as i32) as u16
}

/// `(60 / bpm) / (mode / 4)`
///
/// 16-step mode divides the beat by 4, 12-step mode divides it by 3.
#[inline]
pub fn seconds_per_step(bpm: u16, mode: StepMode) -> f64 {
    (60.0 / bpm as f64) / mode.beat_subdivision()
}

/// How far ahead of the audio the step highlight is allowed to light up.
///
/// Fixed 50ms for short steps. Once a step lasts longer than 100ms the lead
/// becomes `min(step_ms / 10, 15)` so the light doesn't jump ahead at slow tempos.
#[inline]
pub fn visual_compensation_ms(step_duration_ms: f64) -> f64 {
    if step_duration_ms > SLOW_STEP_THRESHOLD_MS {
        (step_duration_ms / 10.0).min(SLOW_STEP_MAX_COMPENSATION_MS)
    } else {
        VISUAL_LATENCY_MS
    }
}
