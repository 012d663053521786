// Gridclick - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod connection;
pub mod messaging;
pub mod sequencer;
pub mod settings;
pub mod synth;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::AudioError;
pub use audio::engine::AudioEngine;
pub use audio::timing::{AudioClock, AudioTiming, ManualClock, UnavailableClock};
pub use audio::trigger::{EngineTrigger, RecordingTrigger, SoundTrigger, ToneEvent};
pub use connection::wake_lock::{SystemWakeLock, TrackedWakeLock, WakeLock};
pub use messaging::channels::{create_event_channel, create_tone_channel};
pub use messaging::event::MetronomeEvent;
pub use sequencer::{
    AccentLevel, BarCycle, LookAheadScheduler, ManualTicker, Metronome, MetronomeError, Pattern,
    PlaybackState, SequenceConfig, StepMode, StepVisual, Tempo, TransportState,
};
pub use settings::{AccentKey, AccentProfile, AccentProfiles, SettingsStore};
pub use synth::oscillator::Waveform;
pub use synth::voice_manager::VoiceManager;
