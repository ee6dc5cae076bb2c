//! Test support: in-memory stand-ins for the provider and counter contracts.
//!
//! Used by this crate's own tests and by downstream crates that need to feed
//! synthetic event streams through the pipeline without a live runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::counters::{GcCounterSource, ThreadPoolCounterSource};
use crate::error::Result;
use crate::source::{
    EventObserver, EventSource, RawEvent, SubscriptionFilter, SubscriptionId,
};
use crate::stats::{CompactionMode, GcMode, LatencyMode};

/// In-memory [`EventSource`] that synchronously fans pushed events out to
/// every live subscription whose keyword mask matches.
#[derive(Default)]
pub struct TestEventSource {
    next_id: AtomicU64,
    subscriptions: Mutex<Vec<(SubscriptionId, SubscriptionFilter, EventObserver)>>,
}

impl TestEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every subscription matching `keywords`.
    pub fn push(&self, keywords: u64, event: &RawEvent) {
        let subscriptions = self.subscriptions.lock().unwrap();
        for (_, filter, observer) in subscriptions.iter() {
            if filter.keywords & keywords != 0 {
                observer(event);
            }
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

impl EventSource for TestEventSource {
    fn subscribe(
        &self,
        filter: &SubscriptionFilter,
        observer: EventObserver,
    ) -> Result<SubscriptionId> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions
            .lock()
            .unwrap()
            .push((id, filter.clone(), observer));
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|(existing, _, _)| *existing != id);
    }
}

/// Fixed-value [`GcCounterSource`] for sampler tests.
pub struct StubGcCounters;

impl GcCounterSource for StubGcCounters {
    fn gc_mode(&self) -> GcMode {
        GcMode::Workstation
    }

    fn compaction_mode(&self) -> CompactionMode {
        CompactionMode::Default
    }

    fn latency_mode(&self) -> LatencyMode {
        LatencyMode::Interactive
    }

    fn heap_size(&self) -> u64 {
        64 * 1024 * 1024
    }

    fn collection_count(&self, generation: u32) -> u32 {
        10 - generation
    }

    fn generation_size(&self, generation: u32) -> u64 {
        u64::from(generation + 1) * 1024
    }

    fn time_in_gc_percent(&self) -> u32 {
        3
    }
}

/// Fixed-value [`ThreadPoolCounterSource`] for sampler tests.
pub struct StubThreadPoolCounters;

impl ThreadPoolCounterSource for StubThreadPoolCounters {
    fn available_threads(&self) -> (u32, u32) {
        (30, 100)
    }

    fn max_threads(&self) -> (u32, u32) {
        (32, 100)
    }

    fn thread_count(&self) -> u32 {
        12
    }

    fn queue_length(&self) -> u64 {
        2
    }

    fn completed_items_count(&self) -> u64 {
        4096
    }

    fn lock_contention_count(&self) -> u64 {
        7
    }
}
