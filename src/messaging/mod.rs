// Messaging module - Lock-free queues between the UI, the scheduler and the audio thread

pub mod channels;
pub mod event;
pub mod notification;
