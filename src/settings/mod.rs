// Settings module - Accent profiles and their persistence

pub mod store;
pub mod types;

pub use store::{SettingsError, SettingsStore};
pub use types::{AccentKey, AccentProfile, AccentProfiles, ProfileField};
