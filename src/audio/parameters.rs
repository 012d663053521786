// Atomic parameters - Lock-free values written by the UI, read by the audio callback

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Master output volume on first launch
pub const DEFAULT_MASTER_VOLUME: f32 = 0.8;

/// f32 stored as its bit pattern in an AtomicU32. Clones share the value.
#[derive(Clone, Debug)]
pub struct AtomicF32 {
    inner: Arc<AtomicU32>,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(AtomicU32::new(value.to_bits())),
        }
    }

    pub fn set(&self, value: f32) {
        self.inner.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(DEFAULT_MASTER_VOLUME)
    }
}
