// Voice Manager - Pool of scheduled clicks

use super::oscillator::Waveform;
use super::voice::ClickVoice;

/// At 300 BPM in 16-step mode a step lasts 50ms, so only a handful of clicks
/// ever overlap. The pool also holds clicks scheduled up to 100ms ahead.
pub const MAX_VOICES: usize = 32;

pub struct VoiceManager {
    voices: [ClickVoice; MAX_VOICES],
    /// Age counter incremented on each schedule for voice stealing priority
    age_counter: u64,
}

impl VoiceManager {
    pub fn new(sample_rate: f32) -> Self {
        // Pre-allocate all voices
        let voices = std::array::from_fn(|_| ClickVoice::new(sample_rate));

        Self {
            voices,
            age_counter: 0,
        }
    }

    /// Arm a free voice for a click starting at `start_sample`
    pub fn schedule(&mut self, start_sample: u64, frequency: f32, volume: f32, waveform: Waveform) {
        self.age_counter = self.age_counter.wrapping_add(1);

        let index = match self.voices.iter().position(|v| !v.is_active()) {
            Some(index) => index,
            None => self.find_voice_to_steal(),
        };
        self.voices[index].schedule(start_sample, frequency, volume, waveform, self.age_counter);
    }

    /// Oldest sounding voice first; a pending click is only stolen when
    /// every voice is pending.
    fn find_voice_to_steal(&self) -> usize {
        let mut best_index = 0;
        let mut best_priority = (true, u64::MAX);

        for (i, voice) in self.voices.iter().enumerate() {
            let priority = (voice.is_pending(), voice.get_age());
            if priority < best_priority {
                best_priority = priority;
                best_index = i;
            }
        }

        best_index
    }

    /// Mix all voices at absolute position `sample_index`
    pub fn next_sample(&mut self, sample_index: u64) -> f32 {
        self.voices
            .iter_mut()
            .map(|v| v.next_sample(sample_index))
            .sum::<f32>()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }
}
