//! Real time source backed by one worker thread.

use std::{
    io,
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{Callback, Queue, TimeSource, TimerError, TimerHandle};

/// Runs callbacks on a dedicated thread at their deadline.
/// The queue lock is released while a callback runs, so callbacks may schedule or cancel.
pub struct ThreadTimer {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

struct State {
    queue: Queue<Instant>,
    running: bool,
}

impl ThreadTimer {
    pub fn new() -> io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: Queue::new(),
                running: true,
            }),
            wake: Condvar::new(),
        });

        let worker = {
            let shared = shared.clone();
            thread::Builder::new()
                .name("morse-timer".into())
                .spawn(move || run(&shared))?
        };

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Number of callbacks still waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }
}

fn run(shared: &Shared) {
    let mut state = shared.state.lock();
    while state.running {
        if let Some((_, callback)) = state.queue.pop_due(Instant::now()) {
            MutexGuard::unlocked(&mut state, callback);
            continue;
        }

        match state.queue.next_deadline() {
            Some(deadline) => {
                shared.wake.wait_until(&mut state, deadline);
            }
            None => shared.wake.wait(&mut state),
        }
    }

    trace!("Timer worker exiting");
}

impl TimeSource for ThreadTimer {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn schedule_at(
        &self,
        start: Instant,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, TimerError> {
        let mut state = self.shared.state.lock();
        if !state.running {
            return Err(TimerError::Stopped);
        }

        let deadline = start
            .checked_add(delay)
            .ok_or(TimerError::Overflow)?;
        let handle = state.queue.push(deadline, callback);
        self.shared.wake.notify_one();
        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        self.shared.state.lock().queue.cancel(handle);
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.running = false;
            debug!("Stopping timer, dropping {} callbacks", state.queue.len());
            state.queue.clear();
        }
        self.shared.wake.notify_all();

        if let Some(worker) = self.worker.take() {
            // The last owner can be released from inside a callback.
            if worker.thread().id() != thread::current().id() {
                let _ = worker.join();
            }
        }
    }
}
