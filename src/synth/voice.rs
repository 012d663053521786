// Voice - One scheduled click

use super::envelope::ClickEnvelope;
use super::oscillator::{Oscillator, SimpleOscillator, Waveform};

pub struct ClickVoice {
    oscillator: SimpleOscillator,
    envelope: ClickEnvelope,
    volume: f32,
    /// Sample index at which the click starts sounding
    start_sample: u64,
    /// Armed but not yet reached `start_sample`
    pending: bool,
    /// Age counter for voice stealing priority (lower = older)
    age: u64,
}

impl ClickVoice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            oscillator: SimpleOscillator::new(Waveform::Sine, sample_rate),
            envelope: ClickEnvelope::new(sample_rate),
            volume: 0.0,
            start_sample: 0,
            pending: false,
            age: 0,
        }
    }

    /// Arm the voice to start at `start_sample`
    pub fn schedule(
        &mut self,
        start_sample: u64,
        frequency: f32,
        volume: f32,
        waveform: Waveform,
        age: u64,
    ) {
        self.oscillator.set_waveform(waveform);
        self.oscillator.set_frequency(frequency);
        self.oscillator.reset();
        self.envelope.reset();
        self.volume = volume;
        self.start_sample = start_sample;
        self.pending = true;
        self.age = age;
    }

    /// Pending or still sounding
    pub fn is_active(&self) -> bool {
        self.pending || self.envelope.is_active()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn get_age(&self) -> u64 {
        self.age
    }

    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    /// Render the sample at absolute position `sample_index`
    pub fn next_sample(&mut self, sample_index: u64) -> f32 {
        if self.pending {
            if sample_index < self.start_sample {
                return 0.0;
            }
            self.pending = false;
            self.envelope.trigger(self.volume);
        }

        if !self.envelope.is_active() {
            return 0.0;
        }

        let gain = self.envelope.process();
        self.oscillator.next_sample() * gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    #[test]
    fn test_voice_silent_until_start() {
        let mut voice = ClickVoice::new(SAMPLE_RATE);
        voice.schedule(100, 1000.0, 1.0, Waveform::Square, 1);

        for i in 0..100 {
            assert_eq!(voice.next_sample(i), 0.0);
            assert!(voice.is_pending());
        }

        voice.next_sample(100);
        assert!(!voice.is_pending());
        assert!(voice.is_active());
    }

    #[test]
    fn test_voice_ends_after_click() {
        let mut voice = ClickVoice::new(SAMPLE_RATE);
        voice.schedule(0, 440.0, 0.4, Waveform::Triangle, 1);

        let mut peak: f32 = 0.0;
        for i in 0..2400 {
            peak = peak.max(voice.next_sample(i).abs());
        }
        assert!(peak > 0.1);
        assert!(!voice.is_active());
        assert_eq!(voice.next_sample(2400), 0.0);
    }

    #[test]
    fn test_late_voice_starts_immediately() {
        let mut voice = ClickVoice::new(SAMPLE_RATE);
        voice.schedule(10, 440.0, 0.4, Waveform::Square, 1);

        // Audio already past the start: first rendered sample starts the click
        voice.next_sample(500);
        assert!(!voice.is_pending());
        assert!(voice.is_active());
    }
}
