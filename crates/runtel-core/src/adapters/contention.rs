use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::ProviderSubscription;
use crate::error::Result;
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::source::{
    keywords, name_has_prefix, EventLevel, EventSource, RawEvent, SubscriptionFilter,
    RUNTIME_PROVIDER,
};
use crate::stats::ContentionStats;

const CONTENTION_STOP_PREFIX: &str = "ContentionStop_";

/// Collects lock-contention events.
///
/// Contention is raised whenever a thread waits for a monitor or native
/// runtime lock another thread holds; the stop event carries the lock kind
/// and the measured wait duration.
pub struct ContentionEventAdapter {
    pipeline: Arc<Pipeline<ContentionStats>>,
    subscription: ProviderSubscription,
}

impl ContentionEventAdapter {
    /// Filter the adapter subscribes with by default.
    pub fn default_filter() -> SubscriptionFilter {
        SubscriptionFilter::new(
            RUNTIME_PROVIDER,
            EventLevel::Informational,
            keywords::CONTENTION,
        )
    }

    pub fn new(
        source: Arc<dyn EventSource>,
        filter: SubscriptionFilter,
        capacity: usize,
        on_emit: EmitFn<ContentionStats>,
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

fn process_event(pipeline: &Pipeline<ContentionStats>, event: &RawEvent) -> Result<()> {
    if !name_has_prefix(&event.name, CONTENTION_STOP_PREFIX) {
        return Ok(());
    }

    let stats = ContentionStats {
        time: event.timestamp,
        flag: event.u32_at(0)? as u8,
        duration_ns: event.f64_at(2)?,
    };
    pipeline.publish(stats);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::TelemetryError;
    use crate::pipeline::DEFAULT_QUEUE_CAPACITY;
    use crate::source::PayloadValue;
    use crate::testing::TestEventSource;

    fn harness() -> (
        Arc<TestEventSource>,
        ContentionEventAdapter,
        Arc<Mutex<Vec<TelemetryError>>>,
    ) {
        let source = Arc::new(TestEventSource::new());
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_in = Arc::clone(&errors);
        let adapter = ContentionEventAdapter::new(
            Arc::clone(&source) as Arc<dyn EventSource>,
            ContentionEventAdapter::default_filter(),
            DEFAULT_QUEUE_CAPACITY,
            Arc::new(|_| Ok(())),
            Arc::new(move |error| errors_in.lock().unwrap().push(error)),
        );
        (source, adapter, errors)
    }

    fn contention_stop(timestamp: i64, flag: u32, duration_ns: f64) -> RawEvent {
        RawEvent::new(
            "ContentionStop_V1",
            timestamp,
            vec![
                PayloadValue::U32(flag),
                PayloadValue::U32(0),
                PayloadValue::F64(duration_ns),
            ],
        )
    }

    #[test]
    fn test_contention_stop_is_parsed() {
        let (source, adapter, errors) = harness();
        adapter.start().unwrap();

        source.push(keywords::CONTENTION, &contention_stop(500, 0, 1250.0));

        assert_eq!(adapter.queued(), 1);
        assert!(errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_other_contention_events_are_ignored() {
        let (source, adapter, _) = harness();
        adapter.start().unwrap();

        source.push(
            keywords::CONTENTION,
            &RawEvent::new("ContentionStart_V1", 100, vec![]),
        );

        assert_eq!(adapter.queued(), 0);
    }

    #[test]
    fn test_malformed_stop_reaches_error_callback() {
        let (source, adapter, errors) = harness();
        adapter.start().unwrap();

        source.push(
            keywords::CONTENTION,
            &RawEvent::new("ContentionStop_V2", 100, vec![PayloadValue::U32(0)]),
        );

        assert_eq!(adapter.queued(), 0);
        assert!(matches!(
            errors.lock().unwrap()[0],
            TelemetryError::PayloadMissing { index: 2, .. }
        ));
    }
}
