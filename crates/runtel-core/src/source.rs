//! Instrumentation provider contract.
//!
//! The runtime's event provider is a black box behind [`EventSource`]: the
//! collector subscribes with a provider name, a severity level and a keyword
//! mask, and receives [`RawEvent`]s on provider-owned threads. The provider
//! does not buffer on the subscriber's behalf; each adapter's bounded queue
//! is the only buffer in the system.

use std::sync::Arc;

use crate::error::{Result, TelemetryError};

/// Identifier of the managed-runtime event provider the adapters subscribe to.
pub const RUNTIME_PROVIDER: &str = "Microsoft-Windows-DotNETRuntime";

/// Keyword masks selecting event categories within the runtime provider.
pub mod keywords {
    pub const GC: u64 = 0x1;
    pub const CONTENTION: u64 = 0x4000;
    pub const THREADING: u64 = 0x10000;
}

/// Severity level of a subscription or event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    LogAlways = 0,
    Critical = 1,
    Error = 2,
    Warning = 3,
    Informational = 4,
    Verbose = 5,
}

/// One positional payload field of a raw event.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    U32(u32),
    U64(u64),
    I64(i64),
    F64(f64),
    Str(String),
}

/// A named, timestamped event delivered by the provider.
///
/// Timestamps are in the provider's native unit: 100 ns ticks.
/// Payload fields are accessed positionally; accessors return an error when
/// the field is missing or has an unexpected type, so a malformed event can
/// be dropped without destabilizing the provider's dispatch thread.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub name: String,
    pub timestamp: i64,
    pub payload: Vec<PayloadValue>,
}

impl RawEvent {
    pub fn new(name: impl Into<String>, timestamp: i64, payload: Vec<PayloadValue>) -> Self {
        Self {
            name: name.into(),
            timestamp,
            payload,
        }
    }

    fn field(&self, index: usize) -> Result<&PayloadValue> {
        self.payload
            .get(index)
            .ok_or_else(|| TelemetryError::PayloadMissing {
                event: self.name.clone(),
                index,
            })
    }

    fn type_error(&self, index: usize, expected: &'static str) -> TelemetryError {
        TelemetryError::PayloadType {
            event: self.name.clone(),
            index,
            expected,
        }
    }

    /// Reads payload field `index` as `u32`.
    pub fn u32_at(&self, index: usize) -> Result<u32> {
        match self.field(index)? {
            PayloadValue::U32(v) => Ok(*v),
            PayloadValue::U64(v) => {
                u32::try_from(*v).map_err(|_| self.type_error(index, "a u32"))
            }
            _ => Err(self.type_error(index, "a u32")),
        }
    }

    /// Reads payload field `index` as `u64`, widening from `u32`.
    pub fn u64_at(&self, index: usize) -> Result<u64> {
        match self.field(index)? {
            PayloadValue::U32(v) => Ok(u64::from(*v)),
            PayloadValue::U64(v) => Ok(*v),
            _ => Err(self.type_error(index, "a u64")),
        }
    }

    /// Reads payload field `index` as `f64`, widening from integer fields.
    pub fn f64_at(&self, index: usize) -> Result<f64> {
        match self.field(index)? {
            PayloadValue::F64(v) => Ok(*v),
            PayloadValue::U32(v) => Ok(f64::from(*v)),
            PayloadValue::U64(v) => Ok(*v as f64),
            _ => Err(self.type_error(index, "an f64")),
        }
    }
}

/// Handle to an active subscription, used to detach from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Provider name plus severity/keyword filter for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFilter {
    pub provider: String,
    pub level: EventLevel,
    pub keywords: u64,
}

impl SubscriptionFilter {
    pub fn new(provider: impl Into<String>, level: EventLevel, keywords: u64) -> Self {
        Self {
            provider: provider.into(),
            level,
            keywords,
        }
    }
}

/// Callback invoked by the provider for every delivered event.
///
/// Runs on a provider-owned thread; it must never block or panic.
pub type EventObserver = Arc<dyn Fn(&RawEvent) + Send + Sync>;

/// Subscription contract of the instrumentation provider.
pub trait EventSource: Send + Sync {
    /// Registers an observer for events matching `filter`.
    fn subscribe(&self, filter: &SubscriptionFilter, observer: EventObserver)
        -> Result<SubscriptionId>;

    /// Stops delivery for a previously returned subscription.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Case-insensitive ASCII prefix match used to identify event names across
/// versioned suffixes (`GCStart_V1`, `GCStart_V2`, ...).
pub(crate) fn name_has_prefix(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}
