//! Time sources.
//! The scheduler registers every event of a timeline as a delayed callback and cancels
//! whatever is left when playback is stopped.

use std::{collections::BTreeMap, fmt, time::Duration};

use hashbrown::HashMap;

#[cfg(test)]
pub mod manual;
pub mod thread;

pub use thread::ThreadTimer;

/// Work run by a time source once its delay has passed.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Identifies one scheduled callback so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The worker behind the time source has shut down.
    Stopped,
    /// The deadline can not be represented.
    Overflow,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::Stopped => write!(f, "Timer is no longer running"),
            TimerError::Overflow => write!(f, "Timer deadline overflowed"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Something that can run a callback after a delay.
///
/// Implementations must accept a delay of zero, fire callbacks in deadline order with ties
/// broken by the order they were scheduled in, and never start a callback once `cancel` for
/// its handle has returned.
pub trait TimeSource: Send + Sync {
    /// Point in time a batch of callbacks is anchored to.
    type Instant: Copy + Send;

    fn now(&self) -> Self::Instant;

    /// Runs `callback` once `delay` has passed since `start`.
    /// A deadline already in the past fires as soon as possible.
    fn schedule_at(
        &self,
        start: Self::Instant,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, TimerError>;

    fn schedule_after(
        &self,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, TimerError> {
        self.schedule_at(self.now(), delay, callback)
    }

    /// Cancels a callback. Unknown or already fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);
}

/// Deadline ordered callback queue shared by the time source implementations.
pub(crate) struct Queue<T> {
    next_id: u64,
    entries: BTreeMap<(T, u64), Callback>,
    deadlines: HashMap<u64, T>,
}

impl<T: Ord + Copy> Queue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    pub fn push(&mut self, deadline: T, callback: Callback) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.insert((deadline, id), callback);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    /// Removes a callback, returns true if it was still queued.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.entries.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<T> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Takes the earliest callback if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: T) -> Option<(T, Callback)> {
        let (&(deadline, id), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }

        self.deadlines.remove(&id);
        self.entries
            .remove(&(deadline, id))
            .map(|callback| (deadline, callback))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}
