//! Morse playback scheduler.
//!
//! Turns text into a [`Timeline`] and registers every event of it with a [`TimeSource`].
//! The events key a [`ToneOutput`] when they fire. Only one timeline is ever live: every
//! `play` and `stop` bumps a generation counter under the state lock and cancels the pending
//! timer handles, and every callback checks its generation under that same lock before it
//! touches the tone.

use std::{fmt, sync::Arc, time::Duration};

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::{debug, error, info, trace, warn};
use parking_lot::Mutex;

use crate::{
    audio::{ToneError, ToneOutput},
    timer::{TimeSource, TimerError, TimerHandle},
};

pub mod timeline;

pub use timeline::{Action, Timeline, TimelineEvent};

/// PARIS standard, a word is 50 units long.
const UNITS_PER_WORD: f64 = 50.0;

/// Notices kept for a slow or absent reader, older ones are dropped first.
const NOTICE_BACKLOG: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerError {
    /// No code for this character, it was skipped
    UnknownCharacter(char),
    /// Rejected speed or pitch, the previous configuration stays
    InvalidConfiguration(&'static str),
    /// Configuration can only change while idle
    Busy,
    /// The time source refused an event, playback was aborted
    SchedulingFault(TimerError),
    /// The tone output failed while playing, playback was aborted
    ToneFault(ToneError),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::UnknownCharacter(c) => write!(f, "Unknown character: {c:?}"),
            SchedulerError::InvalidConfiguration(e) => write!(f, "Invalid configuration: {e}"),
            SchedulerError::Busy => write!(f, "Can not reconfigure while playing"),
            SchedulerError::SchedulingFault(e) => write!(f, "Scheduling failed: {e}"),
            SchedulerError::ToneFault(e) => write!(f, "Tone output failed: {e}"),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Published by the scheduler as playback progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The timeline started by the `play` call with this generation ran to the end.
    Finished { generation: u64 },
    /// A callback failed and playback was stopped.
    Fault(SchedulerError),
}

/// Result of a successful `play` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    /// Identifies the timeline in later [`Notice::Finished`] messages
    pub generation: u64,
    pub duration_ms: u64,
    /// Number of events registered with the time source
    pub events: usize,
    /// Characters left out of the playback
    pub skipped: Vec<SchedulerError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Speed {
    wpm: f64,
    frequency: f32,
    unit_ms: f64,
}

/// Length of one Morse unit in milliseconds at `wpm` words per minute.
pub fn unit_length_ms(wpm: f64) -> Result<f64, SchedulerError> {
    let unit_ms = 60_000.0 / (wpm * UNITS_PER_WORD);
    if !wpm.is_finite() || wpm <= 0.0 || !unit_ms.is_finite() || unit_ms <= 0.0 {
        return Err(SchedulerError::InvalidConfiguration(
            "words per minute must be positive and give a usable unit length",
        ));
    }

    Ok(unit_ms)
}

impl Speed {
    fn new(wpm: f64, frequency: f32) -> Result<Self, SchedulerError> {
        let unit_ms = unit_length_ms(wpm)?;
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(SchedulerError::InvalidConfiguration(
                "frequency must be positive",
            ));
        }

        Ok(Self {
            wpm,
            frequency,
            unit_ms,
        })
    }
}

/// Plays text as Morse code on a tone output.
pub struct MorseScheduler<O: ToneOutput, S: TimeSource> {
    inner: Arc<Inner<O, S>>,
}

struct Inner<O, S> {
    time: S,
    state: Mutex<State<O>>,
    notices: (Sender<Notice>, Receiver<Notice>),
}

struct State<O> {
    tone: O,
    speed: Speed,
    generation: u64,
    /// Duration of the live timeline, zero when idle
    length: u64,
    pending: Vec<TimerHandle>,
    playing: bool,
}

impl<O, S> MorseScheduler<O, S>
where
    O: ToneOutput + 'static,
    S: TimeSource + 'static,
{
    /// Takes ownership of the tone output and silences it.
    pub fn new(mut tone: O, time: S, wpm: f64, frequency: f32) -> Result<Self, SchedulerError> {
        let speed = Speed::new(wpm, frequency)?;
        tone.set_frequency(frequency)
            .map_err(SchedulerError::ToneFault)?;
        tone.set_active(false).map_err(SchedulerError::ToneFault)?;

        Ok(Self {
            inner: Arc::new(Inner {
                time,
                state: Mutex::new(State {
                    tone,
                    speed,
                    generation: 0,
                    length: 0,
                    pending: Vec::new(),
                    playing: false,
                }),
                notices: channel::bounded(NOTICE_BACKLOG),
            }),
        })
    }

    /// Changes speed and pitch. Only allowed while idle.
    pub fn configure(&self, wpm: f64, frequency: f32) -> Result<(), SchedulerError> {
        let speed = Speed::new(wpm, frequency)?;
        let mut state = self.inner.state.lock();
        if state.playing {
            return Err(SchedulerError::Busy);
        }

        if state.speed.frequency != frequency {
            state
                .tone
                .set_frequency(frequency)
                .map_err(SchedulerError::ToneFault)?;
        }

        debug!("Configured {wpm} wpm ({:.2} ms unit) at {frequency} Hz", speed.unit_ms);
        state.speed = speed;
        Ok(())
    }

    /// Starts playing `text`, cancelling anything still playing first.
    /// Returns as soon as every event is registered.
    pub fn play(&self, text: &str) -> Result<PlaybackReport, SchedulerError> {
        let mut state = self.inner.state.lock();
        self.inner.reset(&mut state);

        let timeline = Timeline::build(text, state.speed.unit_ms);
        let skipped = timeline
            .skipped()
            .iter()
            .map(|x| {
                warn!("Skipping {x}");
                SchedulerError::UnknownCharacter(x.0)
            })
            .collect::<Vec<_>>();

        let generation = state.generation;
        let mut report = PlaybackReport {
            generation,
            duration_ms: timeline.duration_ms(),
            events: 0,
            skipped,
        };

        if timeline.is_empty() {
            debug!("Nothing to play");
            return Ok(report);
        }

        let start = self.inner.time.now();
        for event in timeline.events() {
            let inner = Arc::downgrade(&self.inner);
            let action = event.action;
            let scheduled = self.inner.time.schedule_at(
                start,
                Duration::from_millis(event.offset_ms),
                Box::new(move || {
                    if let Some(inner) = inner.upgrade() {
                        inner.fire(generation, action);
                    }
                }),
            );

            match scheduled {
                Ok(handle) => state.pending.push(handle),
                Err(e) => {
                    error!("Failed to schedule event at {} ms: {e}", event.offset_ms);
                    self.inner.reset(&mut state);
                    return Err(SchedulerError::SchedulingFault(e));
                }
            }
        }

        state.playing = true;
        state.length = timeline.duration_ms();
        report.events = state.pending.len();
        info!(
            "Playing {} characters in {} ms at {} wpm",
            text.chars().count() - report.skipped.len(),
            report.duration_ms,
            state.speed.wpm
        );
        Ok(report)
    }

    /// Cancels playback and silences the tone. Does nothing when idle.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        if state.playing {
            debug!("Stopping playback {}", state.generation);
        }
        self.inner.reset(&mut state);
    }

    /// Same as [`MorseScheduler::stop`].
    pub fn reset(&self) {
        self.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().playing
    }

    /// Duration `text` would play for at the current speed.
    pub fn total_duration_ms(&self, text: &str) -> u64 {
        self.timeline(text).duration_ms()
    }

    /// Events `text` would be played with at the current speed.
    pub fn timeline(&self, text: &str) -> Timeline {
        Timeline::build(text, self.unit_ms())
    }

    /// Duration of the live timeline, zero when idle.
    pub fn length_ms(&self) -> u64 {
        self.inner.state.lock().length
    }

    pub fn unit_ms(&self) -> f64 {
        self.inner.state.lock().speed.unit_ms
    }

    pub fn wpm(&self) -> f64 {
        self.inner.state.lock().speed.wpm
    }

    pub fn frequency(&self) -> f32 {
        self.inner.state.lock().speed.frequency
    }

    /// Receiver for [`Notice`]s.
    /// Every notice goes to one receiver only, so keep a single subscriber.
    /// Only the latest few notices are kept while nobody reads them.
    pub fn notices(&self) -> Receiver<Notice> {
        self.inner.notices.1.clone()
    }
}

impl<O: ToneOutput, S: TimeSource> Inner<O, S> {
    /// Returns to idle. Callbacks of the old generation become no-ops from here on.
    fn reset(&self, state: &mut State<O>) {
        state.generation += 1;
        for handle in state.pending.drain(..) {
            self.time.cancel(handle);
        }

        if let Err(e) = state.tone.set_active(false) {
            warn!("Failed to silence tone: {e}");
        }
        state.length = 0;
        state.playing = false;
    }

    fn fire(&self, generation: u64, action: Action) {
        let mut state = self.state.lock();
        if state.generation != generation || !state.playing {
            trace!("Dropping stale {action:?} of playback {generation}");
            return;
        }

        let result = match action {
            Action::ToneOn => state.tone.set_active(true),
            Action::ToneOff => state.tone.set_active(false),
            Action::Finish => {
                self.reset(&mut state);
                debug!("Playback {generation} finished");
                self.notify(Notice::Finished { generation });
                return;
            }
        };

        if let Err(e) = result {
            error!("Tone output failed, stopping playback: {e}");
            self.reset(&mut state);
            self.notify(Notice::Fault(SchedulerError::ToneFault(e)));
        }
    }

    fn notify(&self, mut notice: Notice) {
        let (tx, rx) = &self.notices;
        // Both ends live in `self`, so the only failure is a full backlog
        while let Err(TrySendError::Full(back)) = tx.try_send(notice) {
            if let Ok(old) = rx.try_recv() {
                trace!("Dropping unread {old:?}");
            }
            notice = back;
        }
    }
}

impl<O: ToneOutput, S: TimeSource> Drop for MorseScheduler<O, S> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        self.inner.reset(&mut state);
    }
}
