// Events - Signals from the metronome core to the UI

use super::notification::Notification;

#[derive(Debug, Clone)]
pub enum MetronomeEvent {
    /// The count-in just handed over to the pattern. Fires at most once per start.
    CountInFinished,
    /// Message for the status line
    Status(Notification),
}

impl MetronomeEvent {
    pub fn is_count_in_finished(&self) -> bool {
        matches!(self, MetronomeEvent::CountInFinished)
    }
}
