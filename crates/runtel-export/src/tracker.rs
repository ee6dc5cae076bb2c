use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use runtel_core::counters::{GcCounterSource, ThreadPoolCounterSource};
use runtel_core::error::Result;
use runtel_core::samplers::SamplerSchedule;
use runtel_core::source::{EventSource, SubscriptionFilter};
use runtel_core::stats::{GcEvent, ThreadPoolEvent};
use runtel_core::{
    EmitFn, ErrorFn, ProfilerTracker, ProfilerTrackerOptions, StatsCallback, StatsHandler,
    TelemetryError, DEFAULT_QUEUE_CAPACITY,
};
use tracing::{debug, info};

use crate::logging::LoggerHandler;
use crate::metrics::MetricsHandler;

/// Exporter profile bound at enable time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerProfile {
    /// Emit through the `metrics` facade.
    Metrics,
    /// Emit as structured `tracing` events.
    Logger,
    /// Caller-supplied [`StatsHandler`]; requires
    /// [`TrackerOptions::custom_handler`].
    Custom,
}

/// Configuration of a [`RuntimeTracker`]. `None` filters use each adapter's
/// default severity/keyword filter.
#[derive(Clone)]
pub struct TrackerOptions {
    pub profile: TrackerProfile,
    pub custom_handler: Option<Arc<dyn StatsHandler>>,
    pub contention_filter: Option<SubscriptionFilter>,
    pub gc_filter: Option<SubscriptionFilter>,
    pub thread_pool_filter: Option<SubscriptionFilter>,
    pub gc_info_schedule: SamplerSchedule,
    pub process_info_schedule: SamplerSchedule,
    pub thread_info_schedule: SamplerSchedule,
    pub queue_capacity: usize,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            profile: TrackerProfile::Metrics,
            custom_handler: None,
            contention_filter: None,
            gc_filter: None,
            thread_pool_filter: None,
            gc_info_schedule: SamplerSchedule::default(),
            process_info_schedule: SamplerSchedule::default(),
            thread_info_schedule: SamplerSchedule::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl TrackerOptions {
    pub fn metrics() -> Self {
        Self::default()
    }

    pub fn logger() -> Self {
        Self {
            profile: TrackerProfile::Logger,
            ..Self::default()
        }
    }

    pub fn custom(handler: Arc<dyn StatsHandler>) -> Self {
        Self {
            profile: TrackerProfile::Custom,
            custom_handler: Some(handler),
            ..Self::default()
        }
    }
}

/// Number of effective activations in this process. The instrumentation
/// subscriptions behind the tracker are process-global singletons, so only
/// the first [`RuntimeTracker::enable`] call may wire them.
static TRACKER_ACTIVATIONS: AtomicUsize = AtomicUsize::new(0);

/// Facade owning the collection pipeline and the exporter profile.
///
/// `enable` is guarded by a process-wide single-activation counter: only the
/// first call on any instance wires adapters to an exporter; later calls, on
/// this or any other instance, are no-ops. Double subscription to the
/// provider is unsafe, so two coexisting trackers must never be treated as
/// independent. The guard resets only on [`RuntimeTracker::cancel`], which is
/// full process-wide teardown.
pub struct RuntimeTracker {
    source: Arc<dyn EventSource>,
    gc_counters: Arc<dyn GcCounterSource>,
    thread_pool_counters: Arc<dyn ThreadPoolCounterSource>,
    options: TrackerOptions,
    inner: Mutex<Option<Arc<ProfilerTracker>>>,
}

impl RuntimeTracker {
    pub fn new(
        source: Arc<dyn EventSource>,
        gc_counters: Arc<dyn GcCounterSource>,
        thread_pool_counters: Arc<dyn ThreadPoolCounterSource>,
        options: TrackerOptions,
    ) -> Self {
        Self {
            source,
            gc_counters,
            thread_pool_counters,
            options,
            inner: Mutex::new(None),
        }
    }

    /// Selects the exporter profile and wires every adapter to it.
    ///
    /// Fails fast with [`TelemetryError::MissingHandler`] when the custom
    /// profile is selected without a handler. If another tracker already
    /// enabled in this process, this call is a no-op.
    pub fn enable(&self) -> Result<()> {
        let handler = self.select_handler()?;

        if TRACKER_ACTIVATIONS.fetch_add(1, Ordering::SeqCst) != 0 {
            debug!("runtime tracker already enabled in this process; enable is a no-op");
            return Ok(());
        }

        let wired = wire_handler(&handler, &self.options);
        match ProfilerTracker::new(
            Arc::clone(&self.source),
            Arc::clone(&self.gc_counters),
            Arc::clone(&self.thread_pool_counters),
            wired,
        ) {
            Ok(tracker) => {
                *self.inner.lock().unwrap() = Some(Arc::new(tracker));
                info!("runtime tracker enabled");
                Ok(())
            }
            Err(error) => {
                TRACKER_ACTIVATIONS.store(0, Ordering::SeqCst);
                Err(error)
            }
        }
    }

    /// Starts collection. A no-op unless this instance's `enable` was the
    /// effective one. Must run inside a tokio runtime.
    pub fn start(&self) -> Result<()> {
        match self.inner.lock().unwrap().as_ref() {
            Some(tracker) => {
                debug!("starting runtime tracker");
                tracker.start()
            }
            None => Ok(()),
        }
    }

    /// Stops collection without discarding queued statistics.
    pub fn stop(&self) {
        if let Some(tracker) = self.inner.lock().unwrap().as_ref() {
            debug!("stopping runtime tracker");
            tracker.stop();
        }
    }

    /// Full teardown: cancels the pipeline, releases the provider
    /// subscriptions and shared timers, and resets the process-wide
    /// activation guard.
    pub fn cancel(&self) {
        if let Some(tracker) = self.inner.lock().unwrap().take() {
            debug!("cancelling runtime tracker");
            tracker.cancel();
            TRACKER_ACTIVATIONS.store(0, Ordering::SeqCst);
        }
    }

    /// Whether this instance holds the effective activation.
    pub fn active(&self) -> bool {
        self.inner.lock().unwrap().is_some()
    }

    fn select_handler(&self) -> Result<Arc<dyn StatsHandler>> {
        match self.options.profile {
            TrackerProfile::Metrics => Ok(Arc::new(MetricsHandler::new())),
            TrackerProfile::Logger => Ok(Arc::new(LoggerHandler::new())),
            TrackerProfile::Custom => self
                .options
                .custom_handler
                .clone()
                .ok_or(TelemetryError::MissingHandler),
        }
    }
}

/// Adapts the six adapter callback slots to the nine handler methods.
fn wire_handler(
    handler: &Arc<dyn StatsHandler>,
    options: &TrackerOptions,
) -> ProfilerTrackerOptions {
    let error_fn = |handler: &Arc<dyn StatsHandler>| -> ErrorFn {
        let handler = Arc::clone(handler);
        Arc::new(move |error| handler.on_error(&error))
    };

    let h = Arc::clone(handler);
    let contention: EmitFn<_> = Arc::new(move |stats| h.on_contention_event(&stats));

    let h = Arc::clone(handler);
    let gc: EmitFn<_> = Arc::new(move |event| match event {
        GcEvent::StartEnd(stats) => h.on_gc_start_end(&stats),
        GcEvent::Suspend(stats) => h.on_gc_suspend(&stats),
    });

    let h = Arc::clone(handler);
    let thread_pool: EmitFn<_> = Arc::new(move |event| match event {
        ThreadPoolEvent::Worker(stats) => h.on_thread_pool_worker(&stats),
        ThreadPoolEvent::Adjustment(stats) => h.on_thread_pool_adjustment(&stats),
        ThreadPoolEvent::StarvationAlert(stats) => h.on_starvation_alert(&stats),
    });

    let h = Arc::clone(handler);
    let gc_info: EmitFn<_> = Arc::new(move |stats| h.on_gc_info(&stats));
    let h = Arc::clone(handler);
    let process_info: EmitFn<_> = Arc::new(move |stats| h.on_process_info(&stats));
    let h = Arc::clone(handler);
    let thread_info: EmitFn<_> = Arc::new(move |stats| h.on_thread_info(&stats));

    ProfilerTrackerOptions {
        contention_event_callback: Some(StatsCallback::new(contention, error_fn(handler))),
        gc_event_callback: Some(StatsCallback::new(gc, error_fn(handler))),
        thread_pool_event_callback: Some(StatsCallback::new(thread_pool, error_fn(handler))),
        gc_info_timer_callback: Some(StatsCallback::new(gc_info, error_fn(handler))),
        process_info_timer_callback: Some(StatsCallback::new(process_info, error_fn(handler))),
        thread_info_timer_callback: Some(StatsCallback::new(thread_info, error_fn(handler))),
        contention_filter: options.contention_filter.clone(),
        gc_filter: options.gc_filter.clone(),
        thread_pool_filter: options.thread_pool_filter.clone(),
        gc_info_schedule: options.gc_info_schedule,
        process_info_schedule: options.process_info_schedule,
        thread_info_schedule: options.thread_info_schedule,
        queue_capacity: options.queue_capacity,
    }
}
