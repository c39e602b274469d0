//! cpal backed tone output.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use cpal::{
    traits::DeviceTrait, Device, OutputCallbackInfo, SampleFormat, Stream, SupportedStreamConfig,
};
use log::error;
use parking_lot::Mutex;

use super::{tone::Oscillator, ToneError, ToneOutput};

/// Keys an [`Oscillator`] that a cpal output stream is pulling samples from.
/// The stream itself stays with the caller, cpal streams can not move between threads.
pub struct CpalTone {
    oscillator: Arc<Mutex<Oscillator>>,
    alive: Arc<AtomicBool>,
    gain: f32,
    sample_rate: u32,
}

/// Builds the output stream for `device` and the tone output keying it.
/// The stream is returned paused.
pub fn open(
    device: &Device,
    config: SupportedStreamConfig,
    frequency: f32,
    gain: f32,
) -> Result<(Stream, CpalTone)> {
    if config.sample_format() != SampleFormat::F32 {
        anyhow::bail!(
            "Output device uses {:?} samples, only f32 is supported",
            config.sample_format()
        );
    }

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let oscillator = Arc::new(Mutex::new(Oscillator::new(frequency, sample_rate)));
    let alive = Arc::new(AtomicBool::new(true));

    let stream = {
        let oscillator = oscillator.clone();
        let alive = alive.clone();
        device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _info: &OutputCallbackInfo| {
                    // Same sample on every channel of a frame
                    let mut oscillator = oscillator.lock();
                    for frame in data.chunks_mut(channels) {
                        let sample = oscillator.next().unwrap_or(0.0);
                        frame.iter_mut().for_each(|x| *x = sample);
                    }
                },
                move |err| {
                    error!("Output stream error: {err}");
                    alive.store(false, Ordering::Release);
                },
                None,
            )
            .context("Failed to build output stream")?
    };

    Ok((
        stream,
        CpalTone {
            oscillator,
            alive,
            gain,
            sample_rate,
        },
    ))
}

impl CpalTone {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn check(&self) -> Result<(), ToneError> {
        match self.alive.load(Ordering::Acquire) {
            true => Ok(()),
            false => Err(ToneError::StreamClosed),
        }
    }
}

impl ToneOutput for CpalTone {
    fn set_active(&mut self, active: bool) -> Result<(), ToneError> {
        let gain = if active { self.gain } else { 0.0 };
        self.oscillator.lock().key(gain);

        // Silencing always goes through, only keying down on a dead stream is an error
        if active {
            self.check()?;
        }
        Ok(())
    }

    fn set_frequency(&mut self, frequency: f32) -> Result<(), ToneError> {
        if frequency >= self.sample_rate as f32 / 2.0 {
            return Err(ToneError::UnsupportedFrequency);
        }

        self.check()?;
        self.oscillator.lock().set_tone(frequency);
        Ok(())
    }
}
