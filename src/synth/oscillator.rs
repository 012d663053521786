// Oscillators - Waveform generators for click tones

use std::f32::consts::PI;
use std::fmt;

pub trait Oscillator {
    fn next_sample(&mut self) -> f32;
    fn set_frequency(&mut self, freq: f32);
    fn reset(&mut self);
}

/// Tone shape of an accent profile. Persisted as its lowercase name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct SimpleOscillator {
    waveform: Waveform,
    phase: f32,
    phase_increment: f32,
    sample_rate: f32,
}

impl SimpleOscillator {
    pub fn new(waveform: Waveform, sample_rate: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            phase_increment: 0.0,
            sample_rate,
        }
    }

    /// Change the shape without touching phase or frequency
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }
}

impl Oscillator for SimpleOscillator {
    fn next_sample(&mut self) -> f32 {
        let sample = match self.waveform {
            Waveform::Sine => (self.phase * 2.0 * PI).sin(),
            Waveform::Square => {
                if self.phase < 0.5 { 1.0 } else { -1.0 }
            }
            Waveform::Sawtooth => (self.phase * 2.0) - 1.0,
            Waveform::Triangle => {
                if self.phase < 0.5 {
                    (self.phase * 4.0) - 1.0
                } else {
                    3.0 - (self.phase * 4.0)
                }
            }
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    fn set_frequency(&mut self, freq: f32) {
        self.phase_increment = freq / self.sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;
    const EPSILON: f32 = 0.001;

    #[test]
    fn test_oscillator_frequency() {
        let mut osc = SimpleOscillator::new(Waveform::Sine, SAMPLE_RATE);
        osc.set_frequency(880.0);

        let expected_increment = 880.0 / SAMPLE_RATE;
        assert!((osc.phase_increment - expected_increment).abs() < EPSILON);
    }

    #[test]
    fn test_sine_starts_at_zero() {
        let mut osc = SimpleOscillator::new(Waveform::Sine, SAMPLE_RATE);
        osc.set_frequency(880.0);

        let first_sample = osc.next_sample();
        assert!(first_sample.abs() < EPSILON, "First sample: {}", first_sample);
    }

    #[test]
    fn test_all_waveforms_in_range() {
        for waveform in Waveform::ALL {
            let mut osc = SimpleOscillator::new(waveform, SAMPLE_RATE);
            osc.set_frequency(1500.0);
            for _ in 0..2000 {
                let sample = osc.next_sample();
                assert!(
                    (-1.0..=1.0).contains(&sample),
                    "{} sample out of range: {}",
                    waveform,
                    sample
                );
            }
        }
    }

    #[test]
    fn test_square_wave() {
        let mut osc = SimpleOscillator::new(Waveform::Square, SAMPLE_RATE);
        osc.set_frequency(220.0);

        for _ in 0..1000 {
            let sample = osc.next_sample();
            assert!(
                (sample - 1.0).abs() < EPSILON || (sample + 1.0).abs() < EPSILON,
                "Square wave sample not ±1.0: {}",
                sample
            );
        }
    }

    #[test]
    fn test_phase_wrapping() {
        let mut osc = SimpleOscillator::new(Waveform::Triangle, SAMPLE_RATE);
        osc.set_frequency(440.0);

        for _ in 0..10000 {
            osc.next_sample();
            assert!(
                osc.phase >= 0.0 && osc.phase < 1.0,
                "Phase out of range: {}",
                osc.phase
            );
        }
    }

    #[test]
    fn test_waveform_serde_names() {
        assert_eq!(serde_json::to_string(&Waveform::Sawtooth).unwrap(), "\"sawtooth\"");
        let parsed: Waveform = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(parsed, Waveform::Triangle);
        assert!(serde_json::from_str::<Waveform>("\"saw\"").is_err());
    }
}
