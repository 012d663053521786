// Click envelope implementation
//
// Fixed micro-envelope used for every metronome click:
// linear attack from 0 to the target volume, then an exponential decay
// down to a floor value, after which the voice is silent.

/// Attack duration in seconds
pub const CLICK_ATTACK_SECONDS: f32 = 0.001;

/// Time from note start to end of decay (and oscillator stop) in seconds
pub const CLICK_DECAY_SECONDS: f32 = 0.05;

/// Level reached at the end of the exponential decay
pub const CLICK_DECAY_FLOOR: f32 = 0.001;

/// State of the click envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeState {
    Idle,
    /// Rising linearly to the target volume
    Attack,
    /// Falling exponentially to the floor
    Decay,
}

/// Attack/decay envelope generator for one click
///
/// Sample rate must be set before use.
#[derive(Debug, Clone)]
pub struct ClickEnvelope {
    state: EnvelopeState,
    current_value: f32,
    target: f32,
    sample_rate: f32,

    // Internal counters (in samples)
    attack_samples: f32,
    decay_samples: f32,
    current_sample: f32,
    decay_factor: f32,
}

impl ClickEnvelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: EnvelopeState::Idle,
            current_value: 0.0,
            target: 0.0,
            sample_rate,
            attack_samples: (CLICK_ATTACK_SECONDS * sample_rate).round().max(1.0),
            decay_samples: ((CLICK_DECAY_SECONDS - CLICK_ATTACK_SECONDS) * sample_rate)
                .round()
                .max(1.0),
            current_sample: 0.0,
            decay_factor: 1.0,
        }
    }

    /// Start a click peaking at `volume`
    pub fn trigger(&mut self, volume: f32) {
        self.target = volume.max(CLICK_DECAY_FLOOR);
        self.current_value = 0.0;
        self.current_sample = 0.0;
        // Per-sample multiplier so that target * factor^decay_samples == floor
        self.decay_factor = (CLICK_DECAY_FLOOR / self.target).powf(1.0 / self.decay_samples);
        self.state = EnvelopeState::Attack;
    }

    /// Process one sample and return the gain
    pub fn process(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.current_value = 0.0;
            }
            EnvelopeState::Attack => {
                self.current_value = self.target * (self.current_sample / self.attack_samples);
                self.current_sample += 1.0;
                if self.current_sample >= self.attack_samples {
                    self.current_value = self.target;
                    self.current_sample = 0.0;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.current_value *= self.decay_factor;
                self.current_sample += 1.0;
                if self.current_sample >= self.decay_samples {
                    // Oscillator stop: hard cut at the end of the decay
                    self.current_value = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        self.current_value
    }

    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    pub fn current_value(&self) -> f32 {
        self.current_value
    }

    /// Total length of a click in samples
    pub fn length_samples(&self) -> usize {
        (self.attack_samples + self.decay_samples) as usize
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.current_value = 0.0;
        self.current_sample = 0.0;
    }
}
