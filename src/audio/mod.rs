//! Audio utilities.
//! The tone output the scheduler keys, plus the oscillator and cpal stream behind it.

use std::fmt;

pub mod devices;
pub mod output;
pub mod tone;

/// A fixed pitch tone that can be switched on and off.
pub trait ToneOutput: Send {
    fn set_active(&mut self, active: bool) -> Result<(), ToneError>;

    /// Changes the pitch. Only called while the tone is off.
    fn set_frequency(&mut self, frequency: f32) -> Result<(), ToneError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneError {
    /// The audio stream feeding the device is gone.
    StreamClosed,
    /// The backend can not produce the requested pitch.
    UnsupportedFrequency,
}

impl fmt::Display for ToneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneError::StreamClosed => write!(f, "Audio stream closed"),
            ToneError::UnsupportedFrequency => write!(f, "Frequency not supported by output"),
        }
    }
}

impl std::error::Error for ToneError {}

/// Tone output for machines without audio.
/// Only logs what it would have done.
#[derive(Debug, Default)]
pub struct NullTone {
    active: bool,
}

impl NullTone {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToneOutput for NullTone {
    fn set_active(&mut self, active: bool) -> Result<(), ToneError> {
        if self.active != active {
            log::trace!("Tone {}", if active { "on" } else { "off" });
        }
        self.active = active;
        Ok(())
    }

    fn set_frequency(&mut self, _frequency: f32) -> Result<(), ToneError> {
        Ok(())
    }
}
