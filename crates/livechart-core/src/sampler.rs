//! Background sampling loop and the stop signal shared with the UI loop.
//!
//! Design: one thread, one tick per interval. Each tick asks every source for
//! a value and appends it to that source's series. A malformed value leaves a
//! gap for that source on that tick; the next tick simply tries again.

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::error::SourceError;
use crate::series::{Sample, SeriesStore};
use crate::source::ValueSource;

// ---------------------------------------------------------------------------
// StopSignal
// ---------------------------------------------------------------------------

type StopState = Arc<(Mutex<bool>, Condvar)>;

fn lock_flag(lock: &Mutex<bool>) -> MutexGuard<'_, bool> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Cancellation token observed by both the sampler and the UI loop.
#[derive(Clone)]
pub struct StopSignal {
    inner: StopState,
}

impl StopSignal {
    /// Create a connected (signal, trigger) pair.
    pub fn new() -> (Self, StopTrigger) {
        let inner: StopState = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// A trigger that raises this signal.
    pub fn trigger(&self) -> StopTrigger {
        StopTrigger {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock_flag(lock)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if the full duration elapsed.
    /// Spurious wakeups are absorbed by re-waiting for the remaining time.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock_flag(lock);
        let start = Instant::now();

        loop {
            if *stopped {
                return true;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            stopped = match cvar.wait_timeout(stopped, duration - elapsed) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

/// Raises a [`StopSignal`]. Cheap to clone into signal handlers.
#[derive(Clone)]
pub struct StopTrigger {
    inner: StopState,
}

impl StopTrigger {
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock_flag(lock) = true;
        cvar.notify_all();
    }
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

/// Polls every source once per interval and appends to the store.
///
/// Source `i` feeds series `i` of the store.
pub struct Sampler {
    sources: Vec<Box<dyn ValueSource>>,
    store: Arc<SeriesStore>,
    interval: Duration,
}

impl Sampler {
    pub fn new(
        sources: Vec<Box<dyn ValueSource>>,
        store: Arc<SeriesStore>,
        interval: Duration,
    ) -> Self {
        debug_assert_eq!(sources.len(), store.len());
        Self {
            sources,
            store,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sample every source once. Returns how many samples were appended.
    ///
    /// Malformed values are skipped; any other source failure is returned.
    pub fn tick(&self) -> Result<usize, SourceError> {
        let mut appended = 0;
        for (id, source) in self.sources.iter().enumerate() {
            match source.get_value() {
                Ok(value) => {
                    self.store.append(id, Sample::now(value));
                    appended += 1;
                }
                Err(e) if e.is_format() => debug!("skipping sample: {e}"),
                Err(e) => return Err(e),
            }
        }
        Ok(appended)
    }

    /// Run until `stop` is raised or a source fails fatally.
    ///
    /// A fatal failure raises `stop` itself so the UI loop winds down too.
    pub fn run(self, stop: StopSignal) -> Result<(), SourceError> {
        info!(
            "sampler started: {} source(s) every {:?}",
            self.sources.len(),
            self.interval
        );
        let mut ticks: u64 = 0;
        while !stop.wait_timeout(self.interval) {
            if let Err(e) = self.tick() {
                error!("sampler stopping: {e}");
                stop.trigger().stop();
                return Err(e);
            }
            ticks += 1;
        }
        info!("sampler stopped after {ticks} tick(s)");
        Ok(())
    }

    /// Run on a dedicated background thread.
    pub fn spawn(self, stop: StopSignal) -> io::Result<JoinHandle<Result<(), SourceError>>> {
        thread::Builder::new()
            .name("livechart-sampler".into())
            .spawn(move || self.run(stop))
    }
}
