//! Central dispatcher owning one instance of each adapter and sampler.
//!
//! The tracker wires producer adapters to exporter callbacks, runs one
//! consumer task per adapter, and drives the shared lifecycle:
//! `Created -> Started <-> Stopped -> Cancelled` (terminal).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapters::{ContentionEventAdapter, GcEventAdapter, ThreadPoolEventAdapter};
use crate::counters::{GcCounterSource, ThreadPoolCounterSource};
use crate::error::Result;
use crate::pipeline::{EmitFn, ErrorFn, DEFAULT_QUEUE_CAPACITY};
use crate::samplers::{GcInfoSampler, ProcessInfoSampler, SamplerSchedule, ThreadInfoSampler};
use crate::source::{EventSource, SubscriptionFilter};
use crate::stats::{
    ContentionStats, GcEvent, GcInfoStats, ProcessInfoStats, ThreadInfoStats, ThreadPoolEvent,
};

const STATE_CREATED: u8 = 0;
const STATE_STARTED: u8 = 1;
const STATE_STOPPED: u8 = 2;
const STATE_CANCELLED: u8 = 3;

/// Emit/error callback pair bound to one statistic category.
#[derive(Clone)]
pub struct StatsCallback<T> {
    pub on_emit: EmitFn<T>,
    pub on_error: ErrorFn,
}

impl<T> StatsCallback<T> {
    pub fn new(on_emit: EmitFn<T>, on_error: ErrorFn) -> Self {
        Self { on_emit, on_error }
    }
}

/// Wiring for a [`ProfilerTracker`]: which categories to collect and where
/// their statistics go. A category without a callback is not collected.
/// A `None` filter uses the adapter's default severity/keyword filter.
pub struct ProfilerTrackerOptions {
    pub contention_event_callback: Option<StatsCallback<ContentionStats>>,
    pub gc_event_callback: Option<StatsCallback<GcEvent>>,
    pub thread_pool_event_callback: Option<StatsCallback<ThreadPoolEvent>>,
    pub gc_info_timer_callback: Option<StatsCallback<GcInfoStats>>,
    pub process_info_timer_callback: Option<StatsCallback<ProcessInfoStats>>,
    pub thread_info_timer_callback: Option<StatsCallback<ThreadInfoStats>>,
    pub contention_filter: Option<SubscriptionFilter>,
    pub gc_filter: Option<SubscriptionFilter>,
    pub thread_pool_filter: Option<SubscriptionFilter>,
    pub gc_info_schedule: SamplerSchedule,
    pub process_info_schedule: SamplerSchedule,
    pub thread_info_schedule: SamplerSchedule,
    pub queue_capacity: usize,
}

impl Default for ProfilerTrackerOptions {
    fn default() -> Self {
        Self {
            contention_event_callback: None,
            gc_event_callback: None,
            thread_pool_event_callback: None,
            gc_info_timer_callback: None,
            process_info_timer_callback: None,
            thread_info_timer_callback: None,
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

/// Owns the six collection adapters and fans their statistics out to the
/// configured callbacks.
pub struct ProfilerTracker {
    contention: Option<Arc<ContentionEventAdapter>>,
    gc_events: Option<Arc<GcEventAdapter>>,
    thread_pool: Option<Arc<ThreadPoolEventAdapter>>,
    gc_info: Option<Arc<GcInfoSampler>>,
    process_info: Option<Arc<ProcessInfoSampler>>,
    thread_info: Option<Arc<ThreadInfoSampler>>,
    cancel: CancellationToken,
    consumers: Mutex<Vec<JoinHandle<()>>>,
    state: AtomicU8,
}

impl ProfilerTracker {
    /// Builds adapters for every category that has a callback configured.
    pub fn new(
        source: Arc<dyn EventSource>,
        gc_counters: Arc<dyn GcCounterSource>,
        thread_pool_counters: Arc<dyn ThreadPoolCounterSource>,
        options: ProfilerTrackerOptions,
    ) -> Result<Self> {
        let capacity = options.queue_capacity;

        let contention_filter = options
            .contention_filter
            .unwrap_or_else(ContentionEventAdapter::default_filter);
        let gc_filter = options
            .gc_filter
            .unwrap_or_else(GcEventAdapter::default_filter);
        let thread_pool_filter = options
            .thread_pool_filter
            .unwrap_or_else(ThreadPoolEventAdapter::default_filter);

        let contention = options.contention_event_callback.map(|callback| {
            Arc::new(ContentionEventAdapter::new(
                Arc::clone(&source),
                contention_filter,
                capacity,
                callback.on_emit,
                callback.on_error,
            ))
        });
        let gc_events = options.gc_event_callback.map(|callback| {
            Arc::new(GcEventAdapter::new(
                Arc::clone(&source),
                gc_filter,
                capacity,
                callback.on_emit,
                callback.on_error,
            ))
        });
        let thread_pool = options.thread_pool_event_callback.map(|callback| {
            Arc::new(ThreadPoolEventAdapter::new(
                Arc::clone(&source),
                thread_pool_filter,
                capacity,
                callback.on_emit,
                callback.on_error,
            ))
        });
        let gc_info = options.gc_info_timer_callback.map(|callback| {
            Arc::new(GcInfoSampler::new(
                Arc::clone(&gc_counters),
                options.gc_info_schedule,
                capacity,
                callback.on_emit,
                callback.on_error,
            ))
        });
        let process_info = match options.process_info_timer_callback {
            Some(callback) => Some(Arc::new(ProcessInfoSampler::new(
                options.process_info_schedule,
                capacity,
                callback.on_emit,
                callback.on_error,
            )?)),
            None => None,
        };
        let thread_info = options.thread_info_timer_callback.map(|callback| {
            Arc::new(ThreadInfoSampler::new(
                Arc::clone(&thread_pool_counters),
                options.thread_info_schedule,
                capacity,
                callback.on_emit,
                callback.on_error,
            ))
        });

        Ok(Self {
            contention,
            gc_events,
            thread_pool,
            gc_info,
            process_info,
            thread_info,
            cancel: CancellationToken::new(),
            consumers: Mutex::new(Vec::new()),
            state: AtomicU8::new(STATE_CREATED),
        })
    }

    /// Starts every adapter and, on first start, spawns one consumer task per
    /// adapter. A no-op after [`ProfilerTracker::cancel`]. Must run inside a
    /// tokio runtime.
    pub fn start(&self) -> Result<()> {
        if self.state.load(Ordering::SeqCst) == STATE_CANCELLED {
            return Ok(());
        }
        debug!("starting profiler tracker");

        if let Some(adapter) = &self.contention {
            adapter.start()?;
        }
        if let Some(adapter) = &self.gc_events {
            adapter.start()?;
        }
        if let Some(adapter) = &self.thread_pool {
            adapter.start()?;
        }
        if let Some(sampler) = &self.gc_info {
            sampler.start();
        }
        if let Some(sampler) = &self.process_info {
            sampler.start();
        }
        if let Some(sampler) = &self.thread_info {
            sampler.start();
        }

        let mut consumers = self.consumers.lock().unwrap();
        if consumers.is_empty() {
            if let Some(adapter) = &self.contention {
                consumers.push(spawn_consumer(adapter, &self.cancel, |a, c| async move {
                    a.read_results(c).await
                }));
            }
            if let Some(adapter) = &self.gc_events {
                consumers.push(spawn_consumer(adapter, &self.cancel, |a, c| async move {
                    a.read_results(c).await
                }));
            }
            if let Some(adapter) = &self.thread_pool {
                consumers.push(spawn_consumer(adapter, &self.cancel, |a, c| async move {
                    a.read_results(c).await
                }));
            }
            if let Some(sampler) = &self.gc_info {
                consumers.push(spawn_consumer(sampler, &self.cancel, |s, c| async move {
                    s.read_results(c).await
                }));
            }
            if let Some(sampler) = &self.process_info {
                consumers.push(spawn_consumer(sampler, &self.cancel, |s, c| async move {
                    s.read_results(c).await
                }));
            }
            if let Some(sampler) = &self.thread_info {
                consumers.push(spawn_consumer(sampler, &self.cancel, |s, c| async move {
                    s.read_results(c).await
                }));
            }
        }

        self.state.store(STATE_STARTED, Ordering::SeqCst);
        Ok(())
    }

    /// Disables every adapter without touching queue state. Queued statistics
    /// may still be delivered after a restart.
    pub fn stop(&self) {
        if self.state.load(Ordering::SeqCst) == STATE_CANCELLED {
            return;
        }
        debug!("stopping profiler tracker");

        if let Some(adapter) = &self.contention {
            adapter.stop();
        }
        if let Some(adapter) = &self.gc_events {
            adapter.stop();
        }
        if let Some(adapter) = &self.thread_pool {
            adapter.stop();
        }
        if let Some(sampler) = &self.gc_info {
            sampler.stop();
        }
        if let Some(sampler) = &self.process_info {
            sampler.stop();
        }
        if let Some(sampler) = &self.thread_info {
            sampler.stop();
        }

        self.state.store(STATE_STOPPED, Ordering::SeqCst);
    }

    /// Terminal teardown: cancels the consumer tasks, detaches every provider
    /// subscription and disposes the shared sampler timers (process-wide).
    pub fn cancel(&self) {
        if self.state.swap(STATE_CANCELLED, Ordering::SeqCst) == STATE_CANCELLED {
            return;
        }
        debug!("cancelling profiler tracker");

        self.cancel.cancel();
        if let Some(adapter) = &self.contention {
            adapter.cancel();
        }
        if let Some(adapter) = &self.gc_events {
            adapter.cancel();
        }
        if let Some(adapter) = &self.thread_pool {
            adapter.cancel();
        }
        if let Some(sampler) = &self.gc_info {
            sampler.dispose();
        }
        if let Some(sampler) = &self.process_info {
            sampler.dispose();
        }
        if let Some(sampler) = &self.thread_info {
            sampler.dispose();
        }
        self.consumers.lock().unwrap().clear();
    }

    pub fn started(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_STARTED
    }

    pub fn cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STATE_CANCELLED
    }
}

fn spawn_consumer<A, F, Fut>(
    adapter: &Arc<A>,
    cancel: &CancellationToken,
    read: F,
) -> JoinHandle<()>
where
    A: Send + Sync + 'static,
    F: FnOnce(Arc<A>, CancellationToken) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let adapter = Arc::clone(adapter);
    let cancel = cancel.clone();
    tokio::spawn(async move { read(adapter, cancel).await })
}
