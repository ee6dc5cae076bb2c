use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::ProviderSubscription;
use crate::error::Result;
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::source::{
    keywords, name_has_prefix, EventLevel, EventSource, RawEvent, SubscriptionFilter,
    RUNTIME_PROVIDER,
};
use crate::stats::{
    ThreadPoolAdjustmentStats, ThreadPoolEvent, ThreadPoolWorkerStats, REASON_CLIMBING_MOVE,
    REASON_STARVATION,
};

const WORKER_WAIT_EVENT: &str = "ThreadPoolWorkerThreadWait";
const ADJUSTMENT_EVENT: &str = "ThreadPoolWorkerThreadAdjustmentAdjustment";
const WORKER_STOP_PREFIX: &str = "ThreadPoolWorkerThreadStop";

/// Collects worker-pool events.
///
/// Adjustment events driven by the hill-climbing heuristic
/// ([`REASON_CLIMBING_MOVE`]) are discarded: they are routine tuning noise.
/// A starvation adjustment ([`REASON_STARVATION`]) additionally publishes a
/// [`ThreadPoolEvent::StarvationAlert`] so the exporter can raise it at high
/// severity.
pub struct ThreadPoolEventAdapter {
    pipeline: Arc<Pipeline<ThreadPoolEvent>>,
    subscription: ProviderSubscription,
}

impl ThreadPoolEventAdapter {
    /// Filter the adapter subscribes with by default.
    pub fn default_filter() -> SubscriptionFilter {
        SubscriptionFilter::new(
            RUNTIME_PROVIDER,
            EventLevel::Informational,
            keywords::THREADING,
        )
    }

    pub fn new(
        source: Arc<dyn EventSource>,
        filter: SubscriptionFilter,
        capacity: usize,
        on_emit: EmitFn<ThreadPoolEvent>,
        on_error: ErrorFn,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(capacity, on_emit, on_error)),
            subscription: ProviderSubscription::new(source, filter),
        }
    }

    pub fn start(&self) -> Result<()> {
        self.pipeline.start();
        let pipeline = Arc::clone(&self.pipeline);
        self.subscription.attach(Arc::new(move |event| {
            if let Err(error) = process_event(&pipeline, event) {
                pipeline.report_error(error);
            }
        }))
    }

    pub fn stop(&self) {
        self.pipeline.stop();
    }

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

fn process_event(pipeline: &Pipeline<ThreadPoolEvent>, event: &RawEvent) -> Result<()> {
    let name = event.name.as_str();
    if name.eq_ignore_ascii_case(WORKER_WAIT_EVENT) {
        return Ok(());
    }

    if name.eq_ignore_ascii_case(ADJUSTMENT_EVENT) {
        let reason = event.u32_at(2)?;
        if reason == REASON_CLIMBING_MOVE {
            return Ok(());
        }

        let stats = ThreadPoolAdjustmentStats {
            time: event.timestamp,
            average_throughput: event.f64_at(0)?,
            new_worker_count: event.u32_at(1)?,
            reason,
        };
        pipeline.publish(ThreadPoolEvent::Adjustment(stats));
        if reason == REASON_STARVATION {
            pipeline.publish(ThreadPoolEvent::StarvationAlert(stats));
        }
    } else if name_has_prefix(name, WORKER_STOP_PREFIX) {
        let stats = ThreadPoolWorkerStats {
            time: event.timestamp,
            active_workers: event.u32_at(0)?,
        };
        pipeline.publish(ThreadPoolEvent::Worker(stats));
    }

    Ok(())
}
