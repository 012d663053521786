// Synth module - Click voices rendered by the audio callback

pub mod envelope;
pub mod oscillator;
pub mod voice;
pub mod voice_manager;
