// DSP utilities - Output hygiene for the click mix
//
// Everything here runs inside the audio callback: no allocation, no locks.

/// Values below this are treated as zero
const DENORMAL_THRESHOLD: f32 = 1e-15;

/// Master volume changes are smoothed over this time constant
pub const MASTER_SMOOTHING_MS: f32 = 10.0;

/// Replace denormal-range values with 0.0
///
/// The tail of every click decays towards zero; keeping it out of the
/// denormal range avoids slow float paths on some CPUs.
#[inline]
pub fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// tanh saturation, keeps overlapping clicks inside [-1, 1]
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

/// First-order low-pass on a control value
///
/// `y[n] = y[n-1] + a * (x[n] - y[n-1])` with `a = 1 / (tau * sample_rate)`.
#[derive(Debug, Clone)]
pub struct OnePoleSmoother {
    current: f32,
    coefficient: f32,
}

impl OnePoleSmoother {
    pub fn new(initial_value: f32, time_constant_ms: f32, sample_rate: f32) -> Self {
        let time_constant_samples = (time_constant_ms * 0.001 * sample_rate).max(1.0);

        Self {
            current: initial_value,
            coefficient: (1.0 / time_constant_samples).min(1.0),
        }
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.current += self.coefficient * (target - self.current);
        self.current = flush_denormals_to_zero(self.current);
        self.current
    }

    pub fn get(&self) -> f32 {
        self.current
    }
}

/// Final gain stage applied to the summed voices
#[derive(Debug, Clone)]
pub struct MasterGain {
    smoother: OnePoleSmoother,
}

impl MasterGain {
    pub fn new(initial_volume: f32, sample_rate: f32) -> Self {
        Self {
            smoother: OnePoleSmoother::new(initial_volume, MASTER_SMOOTHING_MS, sample_rate),
        }
    }

    /// Flush, scale by the smoothed volume, then saturate
    #[inline]
    pub fn process(&mut self, sample: f32, target_volume: f32) -> f32 {
        let gain = self.smoother.process(target_volume);
        soft_clip(flush_denormals_to_zero(sample) * gain)
    }
}
