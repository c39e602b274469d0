//! Plays text as Morse code.
//!
//! [`scheduler::MorseScheduler`] turns text into a timeline of tone on/off events and keys an
//! [`audio::ToneOutput`] from a [`timer::TimeSource`] as they come due.

pub mod audio;
pub mod coding;
pub mod misc;
pub mod scheduler;
pub mod timer;

pub use scheduler::{MorseScheduler, Notice, PlaybackReport, SchedulerError};
