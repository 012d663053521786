// Session timer - Elapsed practice time shown while the pattern runs

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    started_at: Option<Instant>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting. Returns false if the timer was already running.
    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// `mm:ss` at `now`, "00:00" while stopped
    pub fn display_at(&self, now: Instant) -> String {
        format_elapsed(self.elapsed_at(now))
    }

    pub fn display(&self) -> String {
        self.display_at(Instant::now())
    }
}

/// `mm:ss` with minutes wrapping at 60
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}", minutes, seconds)
}
