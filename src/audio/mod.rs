// Audio module - CPAL backend, audio clock and click scheduling

pub mod dsp_utils;
pub mod engine;
pub mod format_conversion;
pub mod parameters;
pub mod timing;
pub mod trigger;

use crate::connection::status::DeviceStatus;
use thiserror::Error;

/// Audio error types
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Audio configuration error: {0}")]
    Config(String),

    #[error("Unsupported sample format: {0}. Supported formats: F32, I16, U16")]
    UnsupportedFormat(String),

    #[error("Error in stream creation: {0}")]
    BuildStream(String),

    #[error("Error in stream beginning: {0}")]
    PlayStream(String),

    #[error("Audio device is {0}")]
    DeviceUnavailable(DeviceStatus),

    #[error("Audio output unavailable")]
    ClockUnavailable,
}
