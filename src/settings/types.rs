// Accent profiles - Sound definition of each accent level
//
// Three named profiles, weakest to strongest: state1, state2, state3.
// Every value is clamped on the way in so a profile is always playable.

use crate::sequencer::pattern::AccentLevel;
use crate::synth::oscillator::Waveform;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_FREQUENCY: f32 = 50.0;
pub const MAX_FREQUENCY: f32 = 1500.0;
pub const MIN_VOLUME: f32 = 0.01;
pub const MAX_VOLUME: f32 = 1.0;

/// Name of an accent profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentKey {
    State1,
    State2,
    State3,
}

impl AccentKey {
    pub const ALL: [AccentKey; 3] = [AccentKey::State1, AccentKey::State2, AccentKey::State3];

    /// Key used in the settings file
    pub fn name(self) -> &'static str {
        match self {
            AccentKey::State1 => "state1",
            AccentKey::State2 => "state2",
            AccentKey::State3 => "state3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Profile played by a grid cell. `None` for silent cells.
    pub fn for_level(level: AccentLevel) -> Option<Self> {
        match level {
            AccentLevel::Off => None,
            AccentLevel::Weak => Some(AccentKey::State1),
            AccentLevel::Medium => Some(AccentKey::State2),
            AccentLevel::Strong => Some(AccentKey::State3),
        }
    }
}

impl fmt::Display for AccentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field of a profile, as edited from the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileField {
    Frequency(f32),
    Volume(f32),
    Waveform(Waveform),
}

/// Frequency, volume and waveform of one accent level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccentProfile {
    /// Hz, 50–1500
    pub freq: f32,
    /// 0.01–1.0
    pub vol: f32,
    #[serde(rename = "type")]
    pub waveform: Waveform,
}

impl AccentProfile {
    /// Create a profile with clamped values
    pub fn new(freq: f32, vol: f32, waveform: Waveform) -> Self {
        Self {
            freq: clamp_frequency(freq),
            vol: clamp_volume(vol),
            waveform,
        }
    }

    /// Same profile with every value forced back into range
    pub fn clamped(self) -> Self {
        Self::new(self.freq, self.vol, self.waveform)
    }

    /// Apply one edited field (clamped)
    pub fn apply(&mut self, field: ProfileField) {
        match field {
            ProfileField::Frequency(freq) => self.freq = clamp_frequency(freq),
            ProfileField::Volume(vol) => self.vol = clamp_volume(vol),
            ProfileField::Waveform(waveform) => self.waveform = waveform,
        }
    }
}

fn clamp_frequency(freq: f32) -> f32 {
    if freq.is_nan() {
        return MIN_FREQUENCY;
    }
    freq.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
}

fn clamp_volume(vol: f32) -> f32 {
    if vol.is_nan() {
        return MIN_VOLUME;
    }
    vol.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// The three accent profiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccentProfiles {
    pub state1: AccentProfile,
    pub state2: AccentProfile,
    pub state3: AccentProfile,
}

impl AccentProfiles {
    /// Built-in values restored by a factory reset
    pub fn factory() -> Self {
        Self {
            state1: AccentProfile::new(220.0, 0.2, Waveform::Square),
            state2: AccentProfile::new(440.0, 0.4, Waveform::Triangle),
            state3: AccentProfile::new(880.0, 0.8, Waveform::Sine),
        }
    }

    pub fn get(&self, key: AccentKey) -> &AccentProfile {
        match key {
            AccentKey::State1 => &self.state1,
            AccentKey::State2 => &self.state2,
            AccentKey::State3 => &self.state3,
        }
    }

    pub fn get_mut(&mut self, key: AccentKey) -> &mut AccentProfile {
        match key {
            AccentKey::State1 => &mut self.state1,
            AccentKey::State2 => &mut self.state2,
            AccentKey::State3 => &mut self.state3,
        }
    }

    /// Profile played by a grid cell, `None` when the cell is off
    pub fn for_level(&self, level: AccentLevel) -> Option<&AccentProfile> {
        AccentKey::for_level(level).map(|key| self.get(key))
    }

    /// Profile used by every count-in click
    pub fn count_in(&self) -> &AccentProfile {
        &self.state3
    }

    pub fn set_field(&mut self, key: AccentKey, field: ProfileField) {
        self.get_mut(key).apply(field);
    }
}

impl Default for AccentProfiles {
    fn default() -> Self {
        Self::factory()
    }
}
