//! Timer-driven samplers polling runtime/process counters at a fixed cadence.
//!
//! The underlying timer for a given sampler kind is process-wide: however
//! many instances of that kind exist, only the first to start arms the shared
//! timer (atomic first-one-wins), and every started instance receives ticks
//! through its own registered callback. Disposal is also process-wide — it
//! resets the arm counter and stops the shared timer for every coexisting
//! instance of that kind, so two samplers of the same kind must never be
//! treated as independent.

mod gc_info;
mod process_info;
mod thread_info;

pub use gc_info::GcInfoSampler;
pub use process_info::ProcessInfoSampler;
pub use thread_info::ThreadInfoSampler;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

/// `(due_time, interval)` schedule of one sampler.
///
/// `interval` must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerSchedule {
    /// Delay before the first tick.
    pub due_time: Duration,
    /// Period between ticks.
    pub interval: Duration,
}

impl SamplerSchedule {
    pub fn new(due_time: Duration, interval: Duration) -> Self {
        Self { due_time, interval }
    }
}

impl Default for SamplerSchedule {
    fn default() -> Self {
        Self {
            due_time: Duration::ZERO,
            interval: Duration::from_secs(5),
        }
    }
}

type TickFn = Box<dyn Fn() + Send>;

/// Process-wide timer state for one sampler kind.
///
/// Owned by the process: one static per kind. Arming uses an atomic
/// increment-and-check, not a lock — the check is a plain "am I first" race.
pub(crate) struct SharedTimer {
    armed: AtomicUsize,
    ticks: Mutex<Vec<TickFn>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SharedTimer {
    pub(crate) const fn new() -> Self {
        Self {
            armed: AtomicUsize::new(0),
            ticks: Mutex::new(Vec::new()),
            task: Mutex::new(None),
        }
    }

    /// Adds a tick callback; every registered callback runs on every tick.
    pub(crate) fn register(&'static self, tick: TickFn) {
        self.ticks.lock().unwrap().push(tick);
    }

    /// Arms the timer with `schedule` if no instance armed it yet. The first
    /// caller's schedule wins; later schedules are ignored. Must run inside a
    /// tokio runtime.
    pub(crate) fn arm(&'static self, schedule: SamplerSchedule) {
        if self.armed.fetch_add(1, Ordering::SeqCst) != 0 {
            return;
        }

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + schedule.due_time;
            let mut interval = tokio::time::interval_at(start, schedule.interval);
            loop {
                interval.tick().await;
                for tick in self.ticks.lock().unwrap().iter() {
                    tick();
                }
            }
        });
        *self.task.lock().unwrap() = Some(handle);
    }

    /// Process-wide teardown: resets the arm counter, stops the timer and
    /// drops every registration.
    pub(crate) fn dispose(&'static self) {
        self.armed.store(0, Ordering::SeqCst);
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
        self.ticks.lock().unwrap().clear();
    }

    #[cfg(test)]
    pub(crate) fn is_armed(&'static self) -> bool {
        self.task.lock().unwrap().is_some()
    }

    #[cfg(test)]
    pub(crate) fn arm_count(&'static self) -> usize {
        self.armed.load(Ordering::SeqCst)
    }
}

/// Serializes tests that touch the per-kind timer statics.
#[cfg(test)]
pub(crate) static TIMER_TEST_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
pub(crate) fn timer_test_guard() -> std::sync::MutexGuard<'static, ()> {
    TIMER_TEST_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
