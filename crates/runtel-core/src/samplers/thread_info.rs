use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::{SamplerSchedule, SharedTimer};
use crate::counters::ThreadPoolCounterSource;
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::stats::ThreadInfoStats;

static THREAD_INFO_TIMER: SharedTimer = SharedTimer::new();

/// Samples worker-pool occupancy counters on the shared thread-info timer.
pub struct ThreadInfoSampler {
    pipeline: Arc<Pipeline<ThreadInfoStats>>,
    counters: Arc<dyn ThreadPoolCounterSource>,
    schedule: SamplerSchedule,
    registered: AtomicBool,
}

impl ThreadInfoSampler {
    pub fn new(
        counters: Arc<dyn ThreadPoolCounterSource>,
        schedule: SamplerSchedule,
        capacity: usize,
        on_emit: EmitFn<ThreadInfoStats>,
        on_error: ErrorFn,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(capacity, on_emit, on_error)),
            counters,
            schedule,
            registered: AtomicBool::new(false),
        }
    }

    /// Enables publishing, registers this instance's tick callback on first
    /// start, and arms the shared timer if no other instance has. Must run
    /// inside a tokio runtime.
    pub fn start(&self) {
        self.pipeline.start();
        if !self.registered.swap(true, Ordering::SeqCst) {
            let pipeline = Arc::clone(&self.pipeline);
            let counters = Arc::clone(&self.counters);
            THREAD_INFO_TIMER.register(Box::new(move || tick(&pipeline, &counters)));
        }
        THREAD_INFO_TIMER.arm(self.schedule);
    }

    pub fn stop(&self) {
        self.pipeline.stop();
    }

    /// Process-wide teardown of the shared thread-info timer; affects every
    /// coexisting `ThreadInfoSampler`.
    pub fn dispose(&self) {
        self.pipeline.stop();
        THREAD_INFO_TIMER.dispose();
    }

    pub fn enabled(&self) -> bool {
        self.pipeline.enabled()
    }

    pub fn queued(&self) -> usize {
        self.pipeline.queued()
    }

    /// Consumer loop; see [`Pipeline::read_results`].
    pub async fn read_results(&self, cancel: CancellationToken) {
        self.pipeline.read_results(cancel).await;
    }

    #[cfg(test)]
    pub(crate) fn timer_armed() -> bool {
        THREAD_INFO_TIMER.is_armed()
    }
}

fn tick(pipeline: &Pipeline<ThreadInfoStats>, counters: &Arc<dyn ThreadPoolCounterSource>) {
    if !pipeline.enabled() {
        return;
    }
    pipeline.publish(snapshot(counters.as_ref()));
}

fn snapshot(counters: &dyn ThreadPoolCounterSource) -> ThreadInfoStats {
    let (available_worker_threads, available_io_threads) = counters.available_threads();
    let (max_worker_threads, max_io_threads) = counters.max_threads();
    ThreadInfoStats {
        date: Utc::now(),
        available_worker_threads,
        available_io_threads,
        max_worker_threads,
        max_io_threads,
        thread_count: counters.thread_count(),
        queue_length: counters.queue_length(),
        completed_items_count: counters.completed_items_count(),
        lock_contention_count: counters.lock_contention_count(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::timer_test_guard;
    use super::*;
    use crate::pipeline::DEFAULT_QUEUE_CAPACITY;
    use crate::testing::StubThreadPoolCounters;

    #[test]
    fn test_snapshot_reads_every_counter() {
        let stats = snapshot(&StubThreadPoolCounters);
        assert_eq!(stats.available_worker_threads, 30);
        assert_eq!(stats.max_worker_threads, 32);
        assert_eq!(stats.using_worker_threads(), 2);
        assert_eq!(stats.thread_count, 12);
        assert_eq!(stats.queue_length, 2);
        assert_eq!(stats.completed_items_count, 4096);
        assert_eq!(stats.lock_contention_count, 7);
    }

    #[tokio::test]
    async fn test_sampler_publishes_on_ticks() {
        let _guard = timer_test_guard();

        let sampler = ThreadInfoSampler::new(
            Arc::new(StubThreadPoolCounters),
            SamplerSchedule::new(Duration::ZERO, Duration::from_millis(20)),
            DEFAULT_QUEUE_CAPACITY,
            Arc::new(|_| Ok(())),
            Arc::new(|_| {}),
        );

        sampler.start();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(sampler.queued() > 0);

        sampler.dispose();
        assert!(!ThreadInfoSampler::timer_armed());
    }
}
