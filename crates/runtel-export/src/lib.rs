//! Runtel Exporter Profiles
//!
//! Built-in exporters for the runtel collection pipeline plus the
//! [`RuntimeTracker`] facade that wires them up:
//!
//! - [`MetricsHandler`]: emits through the `metrics` facade with a fixed
//!   dotted naming scheme ([`names`]) and precomputed label sets
//! - [`LoggerHandler`]: renders the same statistics as structured `tracing`
//!   events
//! - a caller-supplied handler implementing
//!   [`StatsHandler`](runtel_core::StatsHandler) via
//!   [`TrackerProfile::Custom`]
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use runtel_export::{RuntimeTracker, TrackerOptions};
//! # fn sources() -> (Arc<dyn runtel_core::source::EventSource>,
//! #     Arc<dyn runtel_core::counters::GcCounterSource>,
//! #     Arc<dyn runtel_core::counters::ThreadPoolCounterSource>) { unimplemented!() }
//!
//! # async fn run() -> runtel_core::Result<()> {
//! let (events, gc_counters, pool_counters) = sources();
//! let tracker = RuntimeTracker::new(events, gc_counters, pool_counters,
//!     TrackerOptions::metrics());
//! tracker.enable()?;
//! tracker.start()?;
//! // ... service runs ...
//! tracker.cancel();
//! # Ok(())
//! # }
//! ```
//!
//! # Process-wide state
//!
//! Enabling is guarded by a process-wide single-activation counter — see
//! [`RuntimeTracker`] for the lifecycle rules.

mod logging;
mod metrics;
pub mod names;
mod tracker;

pub use self::logging::LoggerHandler;
pub use self::metrics::MetricsHandler;
pub use self::tracker::{RuntimeTracker, TrackerOptions, TrackerProfile};
