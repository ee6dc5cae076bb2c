//! Runtel Core Collection Pipeline
//!
//! This crate is the event collection and correlation pipeline of an
//! in-process managed-runtime telemetry collector. It subscribes to the
//! runtime's internal instrumentation events (garbage collection, lock
//! contention, worker-pool adjustment), polls periodic runtime/process
//! counters, normalizes everything into typed statistics, and fans them out
//! to exporter callbacks. It is designed to run continuously inside a
//! long-lived service with negligible impact on the monitored workload.
//!
//! # Architecture
//!
//! - [`stats`]: immutable statistics records, one per observation kind
//! - [`source`]: the instrumentation provider contract ([`RawEvent`],
//!   [`EventSource`]) consumed by the event adapters
//! - [`adapters`]: per-category subscriptions running the raw-event
//!   correlation state machines
//! - [`samplers`]: timer-driven counter polling with a process-wide shared
//!   timer per sampler kind
//! - [`Pipeline`]: the bounded-queue producer/consumer harness every adapter
//!   publishes through (capacity 50, drop-oldest on overflow)
//! - [`ProfilerTracker`]: the dispatcher owning one adapter per category
//! - [`StatsHandler`]: the exporter contract, one method per statistic kind
//! - [`TagCache`]: concurrent memoization of precomputed label sets
//!
//! Data flow: provider -> adapter/sampler (produce) -> bounded queue ->
//! consumer task (drain) -> exporter callback -> external sink.
//!
//! # Backpressure
//!
//! Producers run on provider-owned threads and never block: when a queue is
//! full the oldest unread entry is discarded to admit the new one. A dropped
//! sample is preferable to a stalled runtime — monitoring signals decay with
//! age.
//!
//! # Thread Safety
//!
//! Statistics cross threads by immutable value. The only cross-instance
//! shared mutable state is the per-kind shared sampler timer and the
//! exporter-facade activation guard, both atomic increment-and-check.
//!
//! [`RawEvent`]: source::RawEvent
//! [`EventSource`]: source::EventSource
//! [`Pipeline`]: pipeline::Pipeline
//! [`ProfilerTracker`]: tracker::ProfilerTracker
//! [`StatsHandler`]: handler::StatsHandler
//! [`TagCache`]: tags::TagCache

pub mod adapters;
pub mod counters;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod samplers;
pub mod source;
pub mod stats;
pub mod tags;
pub mod testing;
pub mod tracker;

pub use error::{Result, TelemetryError};
pub use handler::StatsHandler;
pub use pipeline::{EmitFn, ErrorFn, Pipeline, DEFAULT_QUEUE_CAPACITY};
pub use tags::TagCache;
pub use tracker::{ProfilerTracker, ProfilerTrackerOptions, StatsCallback};
