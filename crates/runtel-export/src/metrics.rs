use std::sync::Arc;

use ::metrics::{counter, gauge, Label};
use runtel_core::error::Result;
use runtel_core::stats::{
    ContentionStats, GcInfoStats, GcStartEndStats, GcSuspendStats, ProcessInfoStats,
    ThreadInfoStats, ThreadPoolAdjustmentStats, ThreadPoolWorkerStats,
};
use runtel_core::{StatsHandler, TagCache, TelemetryError};
use tracing::error;

use crate::names;

type Labels = Arc<Vec<Label>>;

/// Metrics-backend exporter profile.
///
/// Emits every statistic through the `metrics` facade; the hosting
/// application decides which recorder (statsd, prometheus, ...) consumes
/// them. Label arrays are precomputed once per distinct key through a
/// [`TagCache`] so the high-frequency event path allocates nothing after
/// warm-up.
pub struct MetricsHandler {
    tags: TagCache<Labels>,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self {
            tags: TagCache::new(),
        }
    }
}

impl Default for MetricsHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsHandler for MetricsHandler {
    fn on_contention_event(&self, stats: &ContentionStats) -> Result<()> {
        let flag_label = stats.flag_label()?;
        let key = format!("contention_type:{}", stats.flag);
        let tags = self.tags.get_or_create(&key, || {
            Arc::new(vec![Label::new("contention_type", flag_label)])
        });
        counter!(names::CONTENTION_STARTEND_COUNT, tags.iter()).increment(1);
        gauge!(names::CONTENTION_STARTEND_DURATION_NS, tags.iter()).set(stats.duration_ns);
        Ok(())
    }

    fn on_gc_start_end(&self, stats: &GcStartEndStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!(
            "gc_gen:{}|{}|{}",
            stats.generation, stats.gc_type, stats.reason
        );
        let tags = self.tags.get_or_create(&key, || {
            Arc::new(vec![
                Label::new("gc_gen", stats.generation.to_string()),
                Label::new("gc_type", stats.gc_type.to_string()),
                Label::new("gc_reason", reason_label),
            ])
        });
        counter!(names::GC_STARTEND_COUNT, tags.iter()).increment(1);
        gauge!(names::GC_STARTEND_DURATION_MS, tags.iter()).set(stats.duration_ms);
        Ok(())
    }

    fn on_gc_suspend(&self, stats: &GcSuspendStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!("gc_suspend:{}", stats.reason);
        let tags = self.tags.get_or_create(&key, || {
            Arc::new(vec![Label::new("gc_suspend_reason", reason_label)])
        });
        counter!(names::GC_SUSPEND_OBJECT_COUNT, tags.iter())
            .increment(u64::from(stats.count));
        gauge!(names::GC_SUSPEND_DURATION_MS, tags.iter()).set(stats.duration_ms);
        Ok(())
    }

    fn on_thread_pool_worker(&self, stats: &ThreadPoolWorkerStats) -> Result<()> {
        gauge!(names::THREADPOOL_AVAILABLE_WORKERTHREAD_COUNT)
            .set(f64::from(stats.active_workers));
        Ok(())
    }

    fn on_thread_pool_adjustment(&self, stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        let reason_label = stats.reason_label()?;
        let key = format!("threadpool_adjustment_reason:{}", stats.reason);
        let tags = self.tags.get_or_create(&key, || {
            Arc::new(vec![Label::new("threadpool_adjustment_reason", reason_label)])
        });
        gauge!(names::THREADPOOL_ADJUSTMENT_AVG_THROUGHPUT, tags.iter())
            .set(stats.average_throughput);
        gauge!(
            names::THREADPOOL_ADJUSTMENT_NEW_WORKERTHREADS_COUNT,
            tags.iter()
        )
        .set(f64::from(stats.new_worker_count));
        Ok(())
    }

    fn on_starvation_alert(&self, _stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        counter!(names::THREADPOOL_STARVATION_COUNT).increment(1);
        Ok(())
    }

    fn on_gc_info(&self, stats: &GcInfoStats) -> Result<()> {
        let base_key = format!(
            "gc_mode:{}|{}|{}",
            stats.gc_mode.label(),
            stats.latency_mode.label(),
            stats.compaction_mode.label()
        );
        let base = self.tags.get_or_create(&base_key, || {
            Arc::new(vec![
                Label::new("gc_mode", stats.gc_mode.label()),
                Label::new("latency_mode", stats.latency_mode.label()),
                Label::new("compaction_mode", stats.compaction_mode.label()),
            ])
        });
        let generation_tags = |generation: &'static str| {
            self.tags
                .get_or_create(&format!("gen{generation}|{base_key}"), || {
                    let mut labels = vec![Label::new("gc_gen", generation)];
                    labels.extend(base.iter().cloned());
                    Arc::new(labels)
                })
        };
        let gen0 = generation_tags("0");
        let gen1 = generation_tags("1");
        let gen2 = generation_tags("2");
        let loh = generation_tags("loh");

        gauge!(names::TIMER_GC_HEAP_SIZE_BYTES, base.iter()).set(stats.heap_size as f64);
        gauge!(names::TIMER_GC_COUNT, gen0.iter()).set(f64::from(stats.gen0_count));
        gauge!(names::TIMER_GC_COUNT, gen1.iter()).set(f64::from(stats.gen1_count));
        gauge!(names::TIMER_GC_COUNT, gen2.iter()).set(f64::from(stats.gen2_count));
        gauge!(names::TIMER_GC_SIZE, gen0.iter()).set(stats.gen0_size as f64);
        gauge!(names::TIMER_GC_SIZE, gen1.iter()).set(stats.gen1_size as f64);
        gauge!(names::TIMER_GC_SIZE, gen2.iter()).set(stats.gen2_size as f64);
        gauge!(names::TIMER_GC_SIZE, loh.iter()).set(stats.loh_size as f64);
        gauge!(names::TIMER_GC_TIME_IN_GC_PERCENT, base.iter())
            .set(f64::from(stats.time_in_gc_percent));
        Ok(())
    }

    fn on_process_info(&self, stats: &ProcessInfoStats) -> Result<()> {
        gauge!(names::TIMER_PROCESS_CPU).set(stats.cpu_percent);
        gauge!(names::TIMER_PROCESS_PRIVATE_BYTES).set(stats.private_bytes as f64);
        gauge!(names::TIMER_PROCESS_WORKING_SETS).set(stats.working_set as f64);
        Ok(())
    }

    fn on_thread_info(&self, stats: &ThreadInfoStats) -> Result<()> {
        gauge!(names::TIMER_THREAD_AVAILABLE_WORKER_THREADS)
            .set(f64::from(stats.available_worker_threads));
        gauge!(names::TIMER_THREAD_AVAILABLE_COMPLETION_PORT_THREADS)
            .set(f64::from(stats.available_io_threads));
        gauge!(names::TIMER_THREAD_MAX_WORKER_THREADS).set(f64::from(stats.max_worker_threads));
        gauge!(names::TIMER_THREAD_MAX_COMPLETION_PORT_THREADS)
            .set(f64::from(stats.max_io_threads));
        gauge!(names::TIMER_THREAD_USING_WORKER_THREADS)
            .set(f64::from(stats.using_worker_threads()));
        gauge!(names::TIMER_THREAD_USING_COMPLETION_PORT_THREADS)
            .set(f64::from(stats.using_io_threads()));
        gauge!(names::TIMER_THREAD_THREAD_COUNT).set(f64::from(stats.thread_count));
        gauge!(names::TIMER_THREAD_QUEUE_LENGTH).set(stats.queue_length as f64);
        gauge!(names::TIMER_THREAD_LOCK_CONTENTION_COUNT)
            .set(stats.lock_contention_count as f64);
        gauge!(names::TIMER_THREAD_COMPLETED_ITEMS_COUNT)
            .set(stats.completed_items_count as f64);
        Ok(())
    }

    fn on_error(&self, error: &TelemetryError) {
        error!(%error, "telemetry pipeline error");
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use runtel_core::stats::{CompactionMode, GcMode, LatencyMode};

    use super::*;

    fn gc_start_end(generation: u32, reason: u32) -> GcStartEndStats {
        GcStartEndStats {
            index: 1,
            gc_type: 0,
            generation,
            reason,
            duration_ms: 0.25,
            start_time: 0,
            end_time: 2500,
        }
    }

    #[test]
    fn test_gc_start_end_labels_are_cached_per_key() {
        let handler = MetricsHandler::new();

        handler.on_gc_start_end(&gc_start_end(2, 1)).unwrap();
        handler.on_gc_start_end(&gc_start_end(2, 1)).unwrap();
        assert_eq!(handler.tags.len(), 1);

        handler.on_gc_start_end(&gc_start_end(0, 0)).unwrap();
        assert_eq!(handler.tags.len(), 2);
    }

    #[test]
    fn test_unknown_reason_surfaces_before_emission() {
        let handler = MetricsHandler::new();
        let result = handler.on_gc_start_end(&gc_start_end(2, 99));
        assert_eq!(
            result,
            Err(TelemetryError::UnknownCode {
                what: "gc reason",
                code: 99,
            })
        );
        assert!(handler.tags.is_empty());
    }

    #[test]
    fn test_gc_info_builds_base_and_generation_tags() {
        let handler = MetricsHandler::new();
        let stats = GcInfoStats {
            date: Utc::now(),
            gc_mode: GcMode::Server,
            compaction_mode: CompactionMode::Default,
            latency_mode: LatencyMode::Interactive,
            heap_size: 1024,
            gen0_count: 1,
            gen1_count: 2,
            gen2_count: 3,
            time_in_gc_percent: 4,
            gen0_size: 10,
            gen1_size: 20,
            gen2_size: 30,
            loh_size: 40,
        };
        handler.on_gc_info(&stats).unwrap();
        // One base entry plus gen0/gen1/gen2/loh.
        assert_eq!(handler.tags.len(), 5);

        handler.on_gc_info(&stats).unwrap();
        assert_eq!(handler.tags.len(), 5);
    }

    #[test]
    fn test_unlabeled_emissions_do_not_touch_the_cache() {
        let handler = MetricsHandler::new();
        handler
            .on_thread_pool_worker(&ThreadPoolWorkerStats {
                time: 0,
                active_workers: 4,
            })
            .unwrap();
        handler
            .on_process_info(&ProcessInfoStats {
                date: Utc::now(),
                cpu_percent: 1.5,
                working_set: 100,
                private_bytes: 200,
            })
            .unwrap();
        assert!(handler.tags.is_empty());
    }
}
