// Settings store - JSON persistence of the accent profiles
//
// File layout: {"state1": {"freq": 220, "vol": 0.2, "type": "square"}, ...}
// Loaded values are merged field by field over the factory profiles.

use super::types::{AccentKey, AccentProfile, AccentProfiles};
use crate::synth::oscillator::Waveform;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory created under the platform config dir
pub const APP_DIR_NAME: &str = "gridclick";

/// Accent profile file name
pub const SETTINGS_FILE_NAME: &str = "audio_settings.json";

/// Settings error types
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

/// Location of the persisted accent profiles
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/gridclick/audio_settings.json`
    pub fn default_location() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME))
    }

    /// Store at the platform default location
    pub fn open_default() -> Result<Self, SettingsError> {
        Ok(Self::new(Self::default_location()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored profiles merged over the factory values.
    /// A missing file is not an error.
    pub fn load(&self) -> Result<AccentProfiles, SettingsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AccentProfiles::factory()),
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(&contents)?;
        let stored = value.as_object().ok_or_else(|| {
            SettingsError::InvalidFormat("top-level value is not an object".to_string())
        })?;

        Ok(merge_over_factory(stored))
    }

    /// Like [`load`](Self::load) but never fails: errors are logged and the
    /// factory profiles are returned instead.
    pub fn load_or_default(&self) -> AccentProfiles {
        match self.load() {
            Ok(profiles) => profiles,
            Err(e) => {
                log::warn!(
                    "Could not load accent settings from {}: {}. Using factory values.",
                    self.path.display(),
                    e
                );
                AccentProfiles::factory()
            }
        }
    }

    /// Write all three profiles, creating the parent directory if needed
    pub fn save(&self, profiles: &AccentProfiles) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let map: BTreeMap<&str, &AccentProfile> = AccentKey::ALL
            .into_iter()
            .map(|key| (key.name(), profiles.get(key)))
            .collect();

        let json = serde_json::to_string_pretty(&map)?;
        fs::write(&self.path, json)?;
        log::debug!("Accent settings saved to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored file and persist the factory profiles
    pub fn reset_factory(&self) -> Result<AccentProfiles, SettingsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let factory = AccentProfiles::factory();
        self.save(&factory)?;
        Ok(factory)
    }
}

/// Overlay every recognised field onto the factory profiles.
/// Unknown keys and malformed fields are skipped.
fn merge_over_factory(stored: &Map<String, Value>) -> AccentProfiles {
    let mut profiles = AccentProfiles::factory();

    for key in AccentKey::ALL {
        let Some(entry) = stored.get(key.name()).and_then(Value::as_object) else {
            continue;
        };
        let profile = profiles.get_mut(key);

        if let Some(freq) = entry.get("freq").and_then(Value::as_f64) {
            profile.freq = freq as f32;
        }
        if let Some(vol) = entry.get("vol").and_then(Value::as_f64) {
            profile.vol = vol as f32;
        }
        if let Some(waveform) = entry
            .get("type")
            .and_then(|v| serde_json::from_value::<Waveform>(v.clone()).ok())
        {
            profile.waveform = waveform;
        }

        *profile = profile.clamped();
    }

    profiles
}
