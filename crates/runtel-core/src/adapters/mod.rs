//! Event source adapters, one per instrumentation category.
//!
//! Each adapter subscribes to the runtime provider with its category's
//! keyword filter, runs a small synchronous state machine over the raw event
//! stream, and publishes typed statistics onto its bounded queue. Raw-event
//! handlers run on the provider's dispatch thread: they never block, and any
//! parse failure is swallowed and forwarded to the error callback so a
//! malformed event cannot destabilize the event source.

mod contention;
mod gc;
mod thread_pool;

pub use contention::ContentionEventAdapter;
pub use gc::GcEventAdapter;
pub use thread_pool::ThreadPoolEventAdapter;

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::source::{EventObserver, EventSource, SubscriptionFilter, SubscriptionId};

/// Converts a tick delta (100 ns units) to milliseconds.
pub(crate) fn ticks_to_ms(ticks: i64) -> f64 {
    ticks as f64 / 10.0 / 1000.0
}

/// Tracks one adapter's provider subscription across start/cancel/restart.
pub(crate) struct ProviderSubscription {
    source: Arc<dyn EventSource>,
    filter: SubscriptionFilter,
    id: Mutex<Option<SubscriptionId>>,
}

impl ProviderSubscription {
    pub(crate) fn new(source: Arc<dyn EventSource>, filter: SubscriptionFilter) -> Self {
        Self {
            source,
            filter,
            id: Mutex::new(None),
        }
    }

    /// Subscribes `observer` unless a subscription is already live.
    pub(crate) fn attach(&self, observer: EventObserver) -> Result<()> {
        let mut id = self.id.lock().unwrap();
        if id.is_none() {
            *id = Some(self.source.subscribe(&self.filter, observer)?);
        }
        Ok(())
    }

    /// Permanently detaches from the provider.
    pub(crate) fn detach(&self) {
        if let Some(id) = self.id.lock().unwrap().take() {
            self.source.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_ms() {
        // 1000 ticks of 100 ns each are 0.1 ms.
        assert_eq!(ticks_to_ms(1000), 0.1);
        assert_eq!(ticks_to_ms(10_000), 1.0);
        assert_eq!(ticks_to_ms(0), 0.0);
    }
}
