// Audio timing - The high-resolution clock every click is scheduled against
//
// The engine's clock is a sample counter advanced by the audio callback, so
// scheduled times share the device's own timeline instead of the wall clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::AudioError;
use crate::connection::status::{AtomicDeviceStatus, DeviceStatus};

/// Monotonic audio-device clock in seconds
pub trait AudioClock: Send + Sync {
    /// Current audio time in seconds
    fn now(&self) -> f64;

    /// Make sure the clock is running before a session starts.
    /// Fails when no audio output is available.
    fn resume(&self) -> Result<(), AudioError>;
}

/// Shared sample counter, incremented by the audio callback
#[derive(Clone, Debug)]
pub struct AudioTiming {
    /// Current sample position (incremented by audio callback)
    sample_position: Arc<AtomicU64>,
    /// Sample rate (for timestamp conversions)
    sample_rate: f64,
}

impl AudioTiming {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_position: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate as f64,
        }
    }

    /// Get current sample position
    pub fn current_sample(&self) -> u64 {
        self.sample_position.load(Ordering::Relaxed)
    }

    /// Advance sample position (called from audio callback)
    pub fn advance(&self, frames: usize) {
        self.sample_position
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Current position in seconds
    pub fn current_seconds(&self) -> f64 {
        self.samples_to_seconds(self.current_sample())
    }

    fn samples_to_seconds(&self, samples: u64) -> f64 {
        samples as f64 / self.sample_rate
    }

    /// Convert an audio time to the sample it falls on.
    /// Negative times map to sample 0.
    pub fn seconds_to_samples(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * self.sample_rate).round() as u64
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate as f32
    }
}

/// Clock of a running [`AudioEngine`](super::engine::AudioEngine)
#[derive(Clone)]
pub struct EngineClock {
    timing: AudioTiming,
    status: AtomicDeviceStatus,
}

impl EngineClock {
    pub fn new(timing: AudioTiming, status: AtomicDeviceStatus) -> Self {
        Self { timing, status }
    }
}

impl AudioClock for EngineClock {
    fn now(&self) -> f64 {
        self.timing.current_seconds()
    }

    fn resume(&self) -> Result<(), AudioError> {
        match self.status.get() {
            DeviceStatus::Connected => Ok(()),
            status => Err(AudioError::DeviceUnavailable(status)),
        }
    }
}

/// Externally driven clock for tests and headless use
///
/// Cloning shares the same time value.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    // f64 bits
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds: Arc::new(AtomicU64::new(seconds.to_bits())),
        }
    }

    pub fn set(&self, seconds: f64) {
        self.seconds.store(seconds.to_bits(), Ordering::Relaxed);
    }

    /// Move the clock forward by `seconds`, returns the new time
    pub fn advance(&self, seconds: f64) -> f64 {
        let now = self.now() + seconds;
        self.set(now);
        now
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Relaxed))
    }

    fn resume(&self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Stand-in when no output device could be opened: every start is refused
#[derive(Clone, Debug, Default)]
pub struct UnavailableClock;

impl AudioClock for UnavailableClock {
    fn now(&self) -> f64 {
        0.0
    }

    fn resume(&self) -> Result<(), AudioError> {
        Err(AudioError::ClockUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_creation() {
        let timing = AudioTiming::new(48000.0);
        assert_eq!(timing.current_sample(), 0);
        assert_eq!(timing.sample_rate(), 48000.0);
        assert_eq!(timing.current_seconds(), 0.0);
    }

    #[test]
    fn test_advance_samples() {
        let timing = AudioTiming::new(48000.0);
        timing.advance(480);
        assert_eq!(timing.current_sample(), 480);
        timing.advance(480);
        assert_eq!(timing.current_sample(), 960);
        assert!((timing.current_seconds() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_seconds_to_samples() {
        let timing = AudioTiming::new(48000.0);
        assert_eq!(timing.seconds_to_samples(1.0), 48000);
        assert_eq!(timing.seconds_to_samples(0.125), 6000);
        assert_eq!(timing.seconds_to_samples(-0.5), 0);
    }

    #[test]
    fn test_engine_clock_requires_connection() {
        let timing = AudioTiming::new(44100.0);
        let status = AtomicDeviceStatus::new(DeviceStatus::Connecting);
        let clock = EngineClock::new(timing.clone(), status.clone());

        assert!(clock.resume().is_err());
        status.set(DeviceStatus::Connected);
        assert!(clock.resume().is_ok());

        timing.advance(44100);
        assert!((clock.now() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(1.5);
        let other = clock.clone();
        clock.advance(0.25);
        assert_eq!(other.now(), 1.75);
        other.set(3.0);
        assert_eq!(clock.now(), 3.0);
    }

    #[test]
    fn test_unavailable_clock_refuses() {
        assert!(matches!(
            UnavailableClock.resume(),
            Err(AudioError::ClockUnavailable)
        ));
    }
}
