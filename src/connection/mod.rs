// Connection module - Audio device status and the keep-display-awake lock

pub mod status;
pub mod wake_lock;
