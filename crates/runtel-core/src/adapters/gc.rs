use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use super::{ticks_to_ms, ProviderSubscription};
use crate::error::Result;
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::source::{
    keywords, name_has_prefix, EventLevel, EventSource, RawEvent, SubscriptionFilter,
    RUNTIME_PROVIDER,
};
use crate::stats::{GcEvent, GcStartEndStats, GcSuspendStats};

const GC_START_PREFIX: &str = "GCStart_";
const GC_END_PREFIX: &str = "GCEnd_";
const SUSPEND_BEGIN_PREFIX: &str = "GCSuspendEEBegin";
const RESTART_END_PREFIX: &str = "GCRestartEEEnd";

/// Pending start marks of the two independent correlation machines.
///
/// Owned exclusively by one adapter instance and touched only from the
/// provider's dispatch thread; the mutex is uncontended in practice.
#[derive(Default)]
struct GcCorrelation {
    start: Option<StartMark>,
    suspend: Option<SuspendMark>,
}

struct StartMark {
    time: i64,
    reason: u32,
    gc_type: u32,
}

struct SuspendMark {
    time: i64,
    reason: u32,
    count: u32,
}

/// Collects garbage-collection events and correlates start/end and
/// suspend/resume pairs into duration statistics.
///
/// The GC event order within one stream is:
/// suspend begin, suspend end, GC start, GC end, restart begin, restart end —
/// with background collections interleaving additional suspend/restart pairs
/// around the same cycle. Suspension is therefore tracked separately from the
/// start/end machine, and a nested suspend overwrites the recorded mark:
/// only the outermost window is measured.
pub struct GcEventAdapter {
    pipeline: Arc<Pipeline<GcEvent>>,
    correlation: Arc<Mutex<GcCorrelation>>,
    subscription: ProviderSubscription,
}

impl GcEventAdapter {
    /// Filter the adapter subscribes with by default.
    pub fn default_filter() -> SubscriptionFilter {
        SubscriptionFilter::new(RUNTIME_PROVIDER, EventLevel::Informational, keywords::GC)
    }

    pub fn new(
        source: Arc<dyn EventSource>,
        filter: SubscriptionFilter,
        capacity: usize,
        on_emit: EmitFn<GcEvent>,
        on_error: ErrorFn,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(capacity, on_emit, on_error)),
            correlation: Arc::new(Mutex::new(GcCorrelation::default())),
            subscription: ProviderSubscription::new(source, filter),
        }
    }

    /// Enables publishing and attaches to the provider. Also serves as
    /// restart: after [`GcEventAdapter::cancel`] the subscription is
    /// re-created.
    pub fn start(&self) -> Result<()> {
        self.pipeline.start();
        let pipeline = Arc::clone(&self.pipeline);
        let correlation = Arc::clone(&self.correlation);
        self.subscription.attach(Arc::new(move |event| {
            if let Err(error) = process_event(&correlation, &pipeline, event) {
                pipeline.report_error(error);
            }
        }))
    }

    /// Disables publishing and draining without touching queue state.
    pub fn stop(&self) {
        self.pipeline.stop();
    }

    /// Releases the provider subscription permanently.
    pub fn cancel(&self) {
        self.pipeline.stop();
        self.subscription.detach();
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
}

fn process_event(
    correlation: &Mutex<GcCorrelation>,
    pipeline: &Pipeline<GcEvent>,
    event: &RawEvent,
) -> Result<()> {
    let name = event.name.as_str();
    if name.is_empty() {
        return Ok(());
    }

    if name_has_prefix(name, GC_START_PREFIX) {
        let mark = StartMark {
            time: event.timestamp,
            reason: event.u32_at(2)?,
            gc_type: event.u32_at(3)?,
        };
        correlation.lock().unwrap().start = Some(mark);
    } else if name_has_prefix(name, GC_END_PREFIX) {
        // An end without a recorded start has nothing to correlate against.
        let Some(mark) = correlation.lock().unwrap().start.take() else {
            return Ok(());
        };
        let stats = GcStartEndStats {
            index: event.u32_at(0)?,
            generation: event.u32_at(1)?,
            gc_type: mark.gc_type,
            reason: mark.reason,
            duration_ms: ticks_to_ms(event.timestamp - mark.time),
            start_time: mark.time,
            end_time: event.timestamp,
        };
        pipeline.publish(GcEvent::StartEnd(stats));
    } else if name_has_prefix(name, SUSPEND_BEGIN_PREFIX) {
        // Last start wins when suspends nest.
        let mark = SuspendMark {
            time: event.timestamp,
            reason: event.u32_at(0)?,
            count: event.u32_at(1)?,
        };
        correlation.lock().unwrap().suspend = Some(mark);
    } else if name_has_prefix(name, RESTART_END_PREFIX) {
        let Some(mark) = correlation.lock().unwrap().suspend.take() else {
            return Ok(());
        };
        let stats = GcSuspendStats {
            duration_ms: ticks_to_ms(event.timestamp - mark.time),
            reason: mark.reason,
            count: mark.count,
        };
        pipeline.publish(GcEvent::Suspend(stats));
    }

    Ok(())
}
