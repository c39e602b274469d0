//! Virtual time for deterministic tests.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{Callback, Queue, TimeSource, TimerError, TimerHandle};

/// Clock that only moves when told to.
/// Clones share the same time and queue.
#[derive(Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    now_ms: u64,
    queue: Queue<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                now_ms: 0,
                queue: Queue::new(),
            })),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.lock().now_ms
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Moves time forward, running every callback that comes due on the way.
    /// Time reads as each callback's deadline while it runs, overdue ones see the current time.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms() + ms;
        loop {
            let callback = {
                let mut inner = self.inner.lock();
                match inner.queue.pop_due(target) {
                    Some((deadline, callback)) => {
                        inner.now_ms = inner.now_ms.max(deadline);
                        callback
                    }
                    None => break,
                }
            };
            callback();
        }

        self.inner.lock().now_ms = target;
    }

    /// Advances until nothing is queued.
    pub fn run_to_end(&self) {
        loop {
            let next = self.inner.lock().queue.next_deadline();
            match next {
                Some(deadline) => self.advance(deadline.saturating_sub(self.now_ms())),
                None => break,
            }
        }
    }
}

impl TimeSource for ManualClock {
    type Instant = u64;

    fn now(&self) -> u64 {
        self.now_ms()
    }

    fn schedule_at(
        &self,
        start: u64,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, TimerError> {
        let delay = u64::try_from(delay.as_millis()).map_err(|_| TimerError::Overflow)?;
        let deadline = start.checked_add(delay).ok_or(TimerError::Overflow)?;
        Ok(self.inner.lock().queue.push(deadline, callback))
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner.lock().queue.cancel(handle);
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use parking_lot::Mutex;
    use std::sync::Arc;

    use super::{ManualClock, TimeSource};

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for delay in [50, 0, 100] {
            let (log, at) = (log.clone(), clock.clone());
            clock
                .schedule_after(
                    Duration::from_millis(delay),
                    Box::new(move || log.lock().push(at.now_ms())),
                )
                .unwrap();
        }

        clock.advance(60);
        assert_eq!(*log.lock(), [0, 50]);
        assert_eq!(clock.now_ms(), 60);

        clock.run_to_end();
        assert_eq!(*log.lock(), [0, 50, 100]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_manual_clock_anchored() {
        let clock = ManualClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let start = clock.now();
        clock.advance(30);

        for delay in [10, 40] {
            let (log, at) = (log.clone(), clock.clone());
            clock
                .schedule_at(
                    start,
                    Duration::from_millis(delay),
                    Box::new(move || log.lock().push(at.now_ms())),
                )
                .unwrap();
        }

        clock.advance(0);
        assert_eq!(*log.lock(), [30]);
        clock.run_to_end();
        assert_eq!(*log.lock(), [30, 40]);
    }

    #[test]
    fn test_manual_clock_callback_can_cancel() {
        let clock = ManualClock::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let victim = {
            let log = log.clone();
            clock
                .schedule_after(
                    Duration::from_millis(20),
                    Box::new(move || log.lock().push("victim")),
                )
                .unwrap()
        };
        {
            let (log, inner) = (log.clone(), clock.clone());
            clock
                .schedule_after(
                    Duration::from_millis(10),
                    Box::new(move || {
                        inner.cancel(victim);
                        log.lock().push("canceller");
                    }),
                )
                .unwrap();
        }

        clock.advance(100);
        assert_eq!(*log.lock(), ["canceller"]);
    }
}
