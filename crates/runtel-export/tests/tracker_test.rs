//! End-to-end tests for the tracker facade: exporter selection, the
//! process-wide single-activation guard, and fan-out from synthetic provider
//! events to a caller-supplied handler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use runtel_core::error::Result;
use runtel_core::source::{keywords, EventSource, PayloadValue, RawEvent};
use runtel_core::stats::{
    ContentionStats, GcInfoStats, GcStartEndStats, GcSuspendStats, ProcessInfoStats,
    ThreadInfoStats, ThreadPoolAdjustmentStats, ThreadPoolWorkerStats, REASON_STARVATION,
};
use runtel_core::testing::{StubGcCounters, StubThreadPoolCounters, TestEventSource};
use runtel_core::{StatsHandler, TelemetryError};
use runtel_export::{RuntimeTracker, TrackerOptions, TrackerProfile};

/// The activation guard is process-wide; tests touching it must not overlap.
static ACTIVATION_TEST_LOCK: Mutex<()> = Mutex::new(());

fn activation_guard() -> MutexGuard<'static, ()> {
    ACTIVATION_TEST_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct RecordingHandler {
    contention: AtomicUsize,
    gc_start_end: AtomicUsize,
    gc_suspend: AtomicUsize,
    worker: AtomicUsize,
    adjustment: AtomicUsize,
    starvation: AtomicUsize,
    gc_info: AtomicUsize,
    process_info: AtomicUsize,
    thread_info: AtomicUsize,
    errors: AtomicUsize,
}

impl StatsHandler for RecordingHandler {
    fn on_contention_event(&self, _stats: &ContentionStats) -> Result<()> {
        self.contention.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_gc_start_end(&self, _stats: &GcStartEndStats) -> Result<()> {
        self.gc_start_end.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_gc_suspend(&self, _stats: &GcSuspendStats) -> Result<()> {
        self.gc_suspend.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_thread_pool_worker(&self, _stats: &ThreadPoolWorkerStats) -> Result<()> {
        self.worker.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_thread_pool_adjustment(&self, _stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        self.adjustment.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_starvation_alert(&self, _stats: &ThreadPoolAdjustmentStats) -> Result<()> {
        self.starvation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_gc_info(&self, _stats: &GcInfoStats) -> Result<()> {
        self.gc_info.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_process_info(&self, _stats: &ProcessInfoStats) -> Result<()> {
        self.process_info.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_thread_info(&self, _stats: &ThreadInfoStats) -> Result<()> {
        self.thread_info.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_error(&self, _error: &TelemetryError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

fn tracker_with(
    source: &Arc<TestEventSource>,
    handler: &Arc<RecordingHandler>,
) -> RuntimeTracker {
    let mut options = TrackerOptions::custom(Arc::clone(handler) as Arc<dyn StatsHandler>);
    options.gc_info_schedule = runtel_core::samplers::SamplerSchedule::new(
        Duration::ZERO,
        Duration::from_millis(25),
    );
    RuntimeTracker::new(
        Arc::clone(source) as Arc<dyn EventSource>,
        Arc::new(StubGcCounters),
        Arc::new(StubThreadPoolCounters),
        options,
    )
}

fn gc_pair(source: &TestEventSource, start_ticks: i64, index: u32) {
    source.push(
        keywords::GC,
        &RawEvent::new(
            "GCStart_V2",
            start_ticks,
            vec![
                PayloadValue::U32(index),
                PayloadValue::U32(2),
                PayloadValue::U32(1),
                PayloadValue::U32(0),
            ],
        ),
    );
    source.push(
        keywords::GC,
        &RawEvent::new(
            "GCEnd_V1",
            start_ticks + 1000,
            vec![PayloadValue::U32(index), PayloadValue::U32(2)],
        ),
    );
}

#[test]
fn test_custom_profile_without_handler_fails_fast() {
    let _guard = activation_guard();

    let source = Arc::new(TestEventSource::new());
    let options = TrackerOptions {
        profile: TrackerProfile::Custom,
        custom_handler: None,
        ..TrackerOptions::default()
    };
    let tracker = RuntimeTracker::new(
        Arc::clone(&source) as Arc<dyn EventSource>,
        Arc::new(StubGcCounters),
        Arc::new(StubThreadPoolCounters),
        options,
    );

    assert_eq!(tracker.enable(), Err(TelemetryError::MissingHandler));
    assert!(!tracker.active());

    // The failed enable must not consume the process-wide activation.
    let handler = Arc::new(RecordingHandler::default());
    let working = tracker_with(&source, &handler);
    working.enable().unwrap();
    assert!(working.active());
    working.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_single_activation_and_fan_out() {
    let _guard = activation_guard();

    let source = Arc::new(TestEventSource::new());
    let first_handler = Arc::new(RecordingHandler::default());
    let second_handler = Arc::new(RecordingHandler::default());

    let first = tracker_with(&source, &first_handler);
    let second = tracker_with(&source, &second_handler);

    first.enable().unwrap();
    // Second enable in the same process is a no-op.
    second.enable().unwrap();
    assert!(first.active());
    assert!(!second.active());

    first.start().unwrap();
    second.start().unwrap();
    // Only one wiring took effect: one subscription per event category.
    assert_eq!(source.subscription_count(), 3);

    // One GC cycle, one suspend window, one starvation adjustment, one
    // contention stop.
    gc_pair(&source, 0, 7);
    source.push(
        keywords::GC,
        &RawEvent::new(
            "GCSuspendEEBegin_V1",
            5_000,
            vec![PayloadValue::U32(1), PayloadValue::U32(1)],
        ),
    );
    source.push(
        keywords::GC,
        &RawEvent::new("GCRestartEEEnd_V1", 9_000, vec![]),
    );
    source.push(
        keywords::THREADING,
        &RawEvent::new(
            "ThreadPoolWorkerThreadAdjustmentAdjustment",
            10_000,
            vec![
                PayloadValue::F64(33.0),
                PayloadValue::U32(64),
                PayloadValue::U32(REASON_STARVATION),
            ],
        ),
    );
    source.push(
        keywords::CONTENTION,
        &RawEvent::new(
            "ContentionStop_V1",
            11_000,
            vec![
                PayloadValue::U32(0),
                PayloadValue::U32(0),
                PayloadValue::F64(870.0),
            ],
        ),
    );

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(first_handler.gc_start_end.load(Ordering::SeqCst), 1);
    assert_eq!(first_handler.gc_suspend.load(Ordering::SeqCst), 1);
    assert_eq!(first_handler.adjustment.load(Ordering::SeqCst), 1);
    assert_eq!(first_handler.starvation.load(Ordering::SeqCst), 1);
    assert_eq!(first_handler.contention.load(Ordering::SeqCst), 1);
    // The GC-info sampler ticked at least once on its 25 ms schedule.
    assert!(first_handler.gc_info.load(Ordering::SeqCst) > 0);

    // No duplicate output: the second tracker saw nothing.
    assert_eq!(second_handler.gc_start_end.load(Ordering::SeqCst), 0);
    assert_eq!(second_handler.contention.load(Ordering::SeqCst), 0);

    // Cancelling the effective tracker resets the guard for full teardown.
    first.cancel();
    assert_eq!(source.subscription_count(), 0);

    second.enable().unwrap();
    assert!(second.active());
    second.cancel();
}
