use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::{SamplerSchedule, SharedTimer};
use crate::counters::GcCounterSource;
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::stats::GcInfoStats;

static GC_INFO_TIMER: SharedTimer = SharedTimer::new();

/// Samples heap and collection counters on the shared GC-info timer.
pub struct GcInfoSampler {
    pipeline: Arc<Pipeline<GcInfoStats>>,
    counters: Arc<dyn GcCounterSource>,
    schedule: SamplerSchedule,
    registered: AtomicBool,
}

impl GcInfoSampler {
    pub fn new(
        counters: Arc<dyn GcCounterSource>,
        schedule: SamplerSchedule,
        capacity: usize,
        on_emit: EmitFn<GcInfoStats>,
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
            GC_INFO_TIMER.register(Box::new(move || tick(&pipeline, &counters)));
        }
        GC_INFO_TIMER.arm(self.schedule);
    }

    pub fn stop(&self) {
        self.pipeline.stop();
    }

    /// Process-wide teardown of the shared GC-info timer; affects every
    /// coexisting `GcInfoSampler`.
    pub fn dispose(&self) {
        self.pipeline.stop();
        GC_INFO_TIMER.dispose();
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
        GC_INFO_TIMER.is_armed()
    }

    #[cfg(test)]
    pub(crate) fn timer_arm_count() -> usize {
        GC_INFO_TIMER.arm_count()
    }
}

fn tick(pipeline: &Pipeline<GcInfoStats>, counters: &Arc<dyn GcCounterSource>) {
    if !pipeline.enabled() {
        return;
    }
    pipeline.publish(snapshot(counters.as_ref()));
}

fn snapshot(counters: &dyn GcCounterSource) -> GcInfoStats {
    GcInfoStats {
        date: Utc::now(),
        gc_mode: counters.gc_mode(),
        compaction_mode: counters.compaction_mode(),
        latency_mode: counters.latency_mode(),
        heap_size: counters.heap_size(),
        gen0_count: counters.collection_count(0),
        gen1_count: counters.collection_count(1),
        gen2_count: counters.collection_count(2),
        time_in_gc_percent: counters.time_in_gc_percent(),
        gen0_size: counters.generation_size(0),
        gen1_size: counters.generation_size(1),
        gen2_size: counters.generation_size(2),
        loh_size: counters.generation_size(3),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::timer_test_guard;
    use super::*;
    use crate::pipeline::DEFAULT_QUEUE_CAPACITY;
    use crate::stats::{CompactionMode, GcMode, LatencyMode};
    use crate::testing::StubGcCounters;

    fn sampler(schedule: SamplerSchedule) -> GcInfoSampler {
        GcInfoSampler::new(
            Arc::new(StubGcCounters),
            schedule,
            DEFAULT_QUEUE_CAPACITY,
            Arc::new(|_| Ok(())),
            Arc::new(|_| {}),
        )
    }

    #[test]
    fn test_snapshot_reads_every_counter() {
        let stats = snapshot(&StubGcCounters);
        assert_eq!(stats.gc_mode, GcMode::Workstation);
        assert_eq!(stats.compaction_mode, CompactionMode::Default);
        assert_eq!(stats.latency_mode, LatencyMode::Interactive);
        assert_eq!(stats.heap_size, 64 * 1024 * 1024);
        assert_eq!(stats.gen0_count, 10);
        assert_eq!(stats.gen2_count, 8);
        assert_eq!(stats.gen0_size, 1024);
        assert_eq!(stats.loh_size, 4096);
        assert_eq!(stats.time_in_gc_percent, 3);
    }

    #[tokio::test]
    async fn test_two_instances_share_one_timer() {
        let _guard = timer_test_guard();

        let schedule = SamplerSchedule::new(Duration::ZERO, Duration::from_millis(20));
        let first = sampler(schedule);
        let second = sampler(schedule);

        first.start();
        second.start();
        assert_eq!(GcInfoSampler::timer_arm_count(), 2);
        assert!(GcInfoSampler::timer_armed());

        tokio::time::sleep(Duration::from_millis(120)).await;
        // Both instances received ticks through their own registrations.
        assert!(first.queued() > 0);
        assert!(second.queued() > 0);

        // Disposal is process-wide and tears the shared timer down once.
        first.dispose();
        assert!(!GcInfoSampler::timer_armed());
        assert_eq!(GcInfoSampler::timer_arm_count(), 0);

        second.dispose();
        assert!(!GcInfoSampler::timer_armed());
    }

    #[tokio::test]
    async fn test_stopped_instance_skips_ticks() {
        let _guard = timer_test_guard();

        let schedule = SamplerSchedule::new(Duration::ZERO, Duration::from_millis(20));
        let instance = sampler(schedule);
        instance.start();
        instance.stop();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(instance.queued(), 0);

        instance.dispose();
    }
}
