use std::sync::Arc;

use runtel_core::error::Result;
use runtel_core::stats::{
    ContentionStats, GcInfoStats, GcStartEndStats, GcSuspendStats, ProcessInfoStats,
    ThreadInfoStats, ThreadPoolAdjustmentStats, ThreadPoolWorkerStats,
};
use runtel_core::{StatsHandler, TagCache, TelemetryError};
use tracing::{debug, error, warn};

use crate::names;

/// Structured-logger exporter profile.
///
/// Renders each statistic as a `tracing` event carrying the metric name, the
/// value and the joined tag string, so the same naming scheme is visible in
/// logs as in a metrics backend. Joined tag strings are cached per distinct
/// key, mirroring [`crate::MetricsHandler`].
pub struct LoggerHandler {
    tags: TagCache<Arc<str>>,
}

impl LoggerHandler {
    pub fn new() -> Self {
        Self {
            tags: TagCache::new(),
        }
    }
}

impl Default for LoggerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsHandler for LoggerHandler {
    fn on_contention_event(&self, stats: &ContentionStats) -> Result<()> {
        let flag_label = stats.flag_label()?;
        let key = format!("contention_type:{}", stats.flag);
        let tags = self
            .tags
            .get_or_create(&key, || Arc::from(format!("contention_type:{flag_label}")));
        debug!(metric = names::CONTENTION_STARTEND_COUNT, value = 1u64, tags = %tags);
        debug!(
            metric = names::CONTENTION_STARTEND_DURATION_NS,
            value = stats.duration_ns,
            tags = %tags,
        );
        Ok(())
    }

    fn on_gc_start_end(&self, stats: &GcStartEndStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!(
            "gc_gen:{}|{}|{}",
            stats.generation, stats.gc_type, stats.reason
        );
        let tags = self.tags.get_or_create(&key, || {
            Arc::from(format!(
                "gc_gen:{},gc_type:{},gc_reason:{}",
                stats.generation, stats.gc_type, reason_label
            ))
        });
        debug!(metric = names::GC_STARTEND_COUNT, value = 1u64, tags = %tags);
        debug!(
            metric = names::GC_STARTEND_DURATION_MS,
            value = stats.duration_ms,
            tags = %tags,
        );
        Ok(())
    }

    fn on_gc_suspend(&self, stats: &GcSuspendStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!("gc_suspend:{}", stats.reason);
        let tags = self
            .tags
            .get_or_create(&key, || Arc::from(format!("gc_suspend_reason:{reason_label}")));
        debug!(
            metric = names::GC_SUSPEND_OBJECT_COUNT,
            value = stats.count,
            tags = %tags,
        );
        debug!(
            metric = names::GC_SUSPEND_DURATION_MS,
            value = stats.duration_ms,
            tags = %tags,
        );
        Ok(())
    }

    fn on_thread_pool_worker(&self, stats: &ThreadPoolWorkerStats) -> Result<()> {
        debug!(
            metric = names::THREADPOOL_AVAILABLE_WORKERTHREAD_COUNT,
            value = stats.active_workers,
        );
        Ok(())
    }

    fn on_thread_pool_adjustment(&self, stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!("threadpool_adjustment_reason:{}", stats.reason);
        let tags = self.tags.get_or_create(&key, || {
            Arc::from(format!("threadpool_adjustment_reason:{reason_label}"))
        });
        debug!(
            metric = names::THREADPOOL_ADJUSTMENT_AVG_THROUGHPUT,
            value = stats.average_throughput,
            tags = %tags,
        );
        debug!(
            metric = names::THREADPOOL_ADJUSTMENT_NEW_WORKERTHREADS_COUNT,
            value = stats.new_worker_count,
            tags = %tags,
        );
        Ok(())
    }

    fn on_starvation_alert(&self, stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        warn!(
            new_worker_count = stats.new_worker_count,
            average_throughput = stats.average_throughput,
            "thread pool starvation detected: the runtime is growing the pool, \
             which degrades host-wide latency; expand the pool ahead of demand"
        );
        Ok(())
    }

    fn on_gc_info(&self, stats: &GcInfoStats) -> Result<()> {
        let key = format!(
            "gc_mode:{}|{}|{}",
            stats.gc_mode.label(),
            stats.latency_mode.label(),
            stats.compaction_mode.label()
        );
        let tags = self.tags.get_or_create(&key, || {
            Arc::from(format!(
                "gc_mode:{},latency_mode:{},compaction_mode:{}",
                stats.gc_mode.label(),
                stats.latency_mode.label(),
                stats.compaction_mode.label()
            ))
        });
        debug!(metric = names::TIMER_GC_HEAP_SIZE_BYTES, value = stats.heap_size, tags = %tags);
        debug!(metric = names::TIMER_GC_COUNT, gc_gen = 0u32, value = stats.gen0_count, tags = %tags);
        debug!(metric = names::TIMER_GC_COUNT, gc_gen = 1u32, value = stats.gen1_count, tags = %tags);
        debug!(metric = names::TIMER_GC_COUNT, gc_gen = 2u32, value = stats.gen2_count, tags = %tags);
        debug!(metric = names::TIMER_GC_SIZE, gc_gen = 0u32, value = stats.gen0_size, tags = %tags);
        debug!(metric = names::TIMER_GC_SIZE, gc_gen = 1u32, value = stats.gen1_size, tags = %tags);
        debug!(metric = names::TIMER_GC_SIZE, gc_gen = 2u32, value = stats.gen2_size, tags = %tags);
        debug!(metric = names::TIMER_GC_SIZE, gc_gen = "loh", value = stats.loh_size, tags = %tags);
        debug!(
            metric = names::TIMER_GC_TIME_IN_GC_PERCENT,
            value = stats.time_in_gc_percent,
            tags = %tags,
        );
        Ok(())
    }

    fn on_process_info(&self, stats: &ProcessInfoStats) -> Result<()> {
        debug!(metric = names::TIMER_PROCESS_CPU, value = stats.cpu_percent);
        debug!(
            metric = names::TIMER_PROCESS_PRIVATE_BYTES,
            value = stats.private_bytes,
        );
        debug!(
            metric = names::TIMER_PROCESS_WORKING_SETS,
            value = stats.working_set,
        );
        Ok(())
    }

    fn on_thread_info(&self, stats: &ThreadInfoStats) -> Result<()> {
        debug!(
            metric = names::TIMER_THREAD_AVAILABLE_WORKER_THREADS,
            value = stats.available_worker_threads,
        );
        debug!(
            metric = names::TIMER_THREAD_AVAILABLE_COMPLETION_PORT_THREADS,
            value = stats.available_io_threads,
        );
        debug!(
            metric = names::TIMER_THREAD_MAX_WORKER_THREADS,
            value = stats.max_worker_threads,
        );
        debug!(
            metric = names::TIMER_THREAD_MAX_COMPLETION_PORT_THREADS,
            value = stats.max_io_threads,
        );
        debug!(
            metric = names::TIMER_THREAD_USING_WORKER_THREADS,
            value = stats.using_worker_threads(),
        );
        debug!(
            metric = names::TIMER_THREAD_USING_COMPLETION_PORT_THREADS,
            value = stats.using_io_threads(),
        );
        debug!(
            metric = names::TIMER_THREAD_THREAD_COUNT,
            value = stats.thread_count,
        );
        debug!(
            metric = names::TIMER_THREAD_QUEUE_LENGTH,
            value = stats.queue_length,
        );
        debug!(
            metric = names::TIMER_THREAD_LOCK_CONTENTION_COUNT,
            value = stats.lock_contention_count,
        );
        debug!(
            metric = names::TIMER_THREAD_COMPLETED_ITEMS_COUNT,
            value = stats.completed_items_count,
        );
        Ok(())
    }

    fn on_error(&self, error: &TelemetryError) {
        error!(%error, "telemetry pipeline error");
    }
}
