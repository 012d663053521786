// Keep-display-awake lock
//
// Acquired on start, released on stop. The platform may revoke it silently
// while playback continues, so the controller re-acquires it when the window
// becomes visible again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, thiserror::Error)]
pub enum WakeLockError {
    #[error("Wake lock not supported on this platform")]
    Unsupported,

    #[error("Wake lock request rejected: {0}")]
    Rejected(String),
}

pub trait WakeLock: Send {
    fn acquire(&mut self) -> Result<(), WakeLockError>;
    fn release(&mut self);
    fn is_held(&self) -> bool;
}

/// Display sleep inhibitor of the operating system
///
/// Holds a `keepawake` guard while acquired. Dropping the guard gives the
/// display back to the power manager.
#[derive(Default)]
pub struct SystemWakeLock {
    guard: Option<keepawake::KeepAwake>,
}

impl SystemWakeLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WakeLock for SystemWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if self.guard.is_some() {
            return Ok(());
        }
        let guard = keepawake::Builder::default()
            .display(true)
            .reason("Metronome playing")
            .app_name("gridclick")
            .app_reverse_domain("io.github.gridclick")
            .create()
            .map_err(|e| WakeLockError::Rejected(e.to_string()))?;
        self.guard = Some(guard);
        log::debug!("System wake lock acquired");
        Ok(())
    }

    fn release(&mut self) {
        if self.guard.take().is_some() {
            log::debug!("System wake lock released");
        }
    }

    fn is_held(&self) -> bool {
        self.guard.is_some()
    }
}

/// Wake lock whose state is shared with a [`WakeLockHandle`]
///
/// The handle lets the platform layer (or a test) revoke the lock behind
/// the controller's back, the way a system would on screen lock.
#[derive(Debug)]
pub struct TrackedWakeLock {
    held: Arc<AtomicBool>,
    supported: bool,
}

/// Observer/revoker side of a [`TrackedWakeLock`]
#[derive(Debug, Clone)]
pub struct WakeLockHandle {
    held: Arc<AtomicBool>,
}

impl TrackedWakeLock {
    pub fn new() -> Self {
        Self {
            held: Arc::new(AtomicBool::new(false)),
            supported: true,
        }
    }

    /// Lock on a platform without wake lock support: every acquire fails
    pub fn unsupported() -> Self {
        Self {
            held: Arc::new(AtomicBool::new(false)),
            supported: false,
        }
    }

    pub fn handle(&self) -> WakeLockHandle {
        WakeLockHandle {
            held: Arc::clone(&self.held),
        }
    }
}

impl Default for TrackedWakeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeLock for TrackedWakeLock {
    fn acquire(&mut self) -> Result<(), WakeLockError> {
        if !self.supported {
            return Err(WakeLockError::Unsupported);
        }
        if !self.held.swap(true, Ordering::AcqRel) {
            log::debug!("Wake lock acquired");
        }
        Ok(())
    }

    fn release(&mut self) {
        if self.held.swap(false, Ordering::AcqRel) {
            log::debug!("Wake lock released");
        }
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl WakeLockHandle {
    /// Drop the lock without telling its owner
    pub fn revoke(&self) {
        if self.held.swap(false, Ordering::AcqRel) {
            log::info!("Wake lock revoked by the system");
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}
