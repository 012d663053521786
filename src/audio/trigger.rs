// Sound trigger - Turns a scheduled accent into one tone event
//
// The scheduler never renders audio itself: it hands a ToneEvent to a
// SoundTrigger, which forwards it to the audio thread (or records it).

use std::sync::{Arc, Mutex};

use ringbuf::traits::Producer;

use crate::messaging::channels::ToneProducer;
use crate::settings::types::AccentProfile;
use crate::synth::oscillator::Waveform;

/// One click committed to the audio clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEvent {
    /// Audio-clock time at which the click starts (seconds)
    pub start_time: f64,
    pub frequency: f32,
    pub volume: f32,
    pub waveform: Waveform,
}

impl ToneEvent {
    pub fn new(start_time: f64, profile: &AccentProfile) -> Self {
        Self {
            start_time,
            frequency: profile.freq,
            volume: profile.vol,
            waveform: profile.waveform,
        }
    }
}

/// Receives every click the scheduler commits
pub trait SoundTrigger: Send {
    fn trigger(&mut self, time: f64, profile: &AccentProfile);
}

/// Forwards clicks to the audio engine through the lock-free tone queue
pub struct EngineTrigger {
    tone_tx: Option<ToneProducer>,
    dropped: u64,
}

impl EngineTrigger {
    pub fn new(tone_tx: ToneProducer) -> Self {
        Self {
            tone_tx: Some(tone_tx),
            dropped: 0,
        }
    }

    /// Trigger with no audio output behind it: every click is ignored
    pub fn disconnected() -> Self {
        Self {
            tone_tx: None,
            dropped: 0,
        }
    }
}

impl SoundTrigger for EngineTrigger {
    fn trigger(&mut self, time: f64, profile: &AccentProfile) {
        let Some(tx) = self.tone_tx.as_mut() else {
            return;
        };

        if tx.try_push(ToneEvent::new(time, profile)).is_err() {
            self.dropped += 1;
            log::warn!(
                "Tone queue full, click at {:.3}s dropped ({} so far)",
                time,
                self.dropped
            );
        }
    }
}

/// Keeps every click in memory. Cloning shares the same log.
#[derive(Clone, Default)]
pub struct RecordingTrigger {
    events: Arc<Mutex<Vec<ToneEvent>>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every click recorded so far
    pub fn events(&self) -> Vec<ToneEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl SoundTrigger for RecordingTrigger {
    fn trigger(&mut self, time: f64, profile: &AccentProfile) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ToneEvent::new(time, profile));
    }
}
