//! Generic bounded-queue producer/consumer harness shared by every adapter.
//!
//! Producers run on provider-owned threads (event callbacks, timer ticks) and
//! must never block: publishing is a non-blocking try-publish that drops the
//! oldest queued entry on overflow. Freshness beats completeness for a
//! monitoring signal whose value decays with age.
//!
//! Each pipeline has exactly one consumer task. [`Pipeline::read_results`] is
//! the suspend point: it parks until the queue has data or the cancellation
//! token fires, then drains synchronously. Two drains never interleave.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::error::TelemetryError;

/// Default per-adapter queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Callback invoked for every drained statistic. An `Err` is routed to the
/// adapter's error callback and the drain continues.
pub type EmitFn<T> = Arc<dyn Fn(T) -> crate::error::Result<()> + Send + Sync>;

/// Callback receiving parse, snapshot and exporter errors.
pub type ErrorFn = Arc<dyn Fn(TelemetryError) + Send + Sync>;

/// Bounded FIFO with drop-oldest overflow.
///
/// Single-writer/single-reader by convention; the internal mutex is only held
/// for a push or pop.
pub(crate) struct StatsChannel<T> {
    capacity: usize,
    queue: Mutex<VecDeque<T>>,
    notify: Notify,
}

impl<T> StatsChannel<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
        }
    }

    /// Enqueues `item`, discarding the oldest unread entry when full.
    pub(crate) fn try_publish(&self, item: T) {
        {
            let mut queue = self.queue.lock().unwrap();
            if queue.len() == self.capacity {
                queue.pop_front();
            }
            queue.push_back(item);
        }
        self.notify.notify_one();
    }

    pub(crate) fn pop(&self) -> Option<T> {
        self.queue.lock().unwrap().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

/// Bounded queue plus lifecycle flag and consumer callbacks: the harness every
/// event adapter and periodic sampler publishes through.
pub struct Pipeline<T> {
    channel: StatsChannel<T>,
    enabled: AtomicBool,
    on_emit: EmitFn<T>,
    on_error: ErrorFn,
}

impl<T> Pipeline<T> {
    pub fn new(capacity: usize, on_emit: EmitFn<T>, on_error: ErrorFn) -> Self {
        Self {
            channel: StatsChannel::new(capacity),
            enabled: AtomicBool::new(false),
            on_emit,
            on_error,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Marks the pipeline enabled; producers may publish and the consumer may
    /// drain.
    pub fn start(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    /// Marks the pipeline disabled. Best-effort: entries already queued stay
    /// queued and may still be delivered after a restart.
    pub fn stop(&self) {
        self.enabled.store(false, Ordering::Release);
    }

    /// Publishes one statistic unless the pipeline is stopped.
    pub fn publish(&self, item: T) {
        if self.enabled() {
            self.channel.try_publish(item);
        }
    }

    /// Routes an adapter-level error to the error callback.
    pub fn report_error(&self, error: TelemetryError) {
        (self.on_error)(error);
    }

    pub fn queued(&self) -> usize {
        self.channel.len()
    }

    /// Consumer loop: parks until data arrives or `cancel` fires, then drains
    /// every currently queued entry through the emit callback. Returns only
    /// on cancellation. While the pipeline is stopped the loop parks without
    /// consuming, leaving queued entries for a later restart.
    pub async fn read_results(&self, cancel: CancellationToken) {
        loop {
            let mut drained = 0usize;
            while self.enabled() {
                match self.channel.pop() {
                    Some(item) => {
                        drained += 1;
                        if let Err(error) = (self.on_emit)(item) {
                            (self.on_error)(error);
                        }
                    }
                    None => break,
                }
            }

            if cancel.is_cancelled() {
                return;
            }
            if drained == 0 {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = self.channel.notify.notified() => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn collecting_pipeline(capacity: usize) -> (Arc<Pipeline<u32>>, Arc<Mutex<Vec<u32>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let on_emit: EmitFn<u32> = Arc::new(move |value| {
            sink.lock().unwrap().push(value);
            Ok(())
        });
        let on_error: ErrorFn = Arc::new(|_| {});
        (Arc::new(Pipeline::new(capacity, on_emit, on_error)), seen)
    }

    #[test]
    fn test_overflow_drops_oldest_entries() {
        let channel = StatsChannel::new(DEFAULT_QUEUE_CAPACITY);
        for value in 0..51u32 {
            channel.try_publish(value);
        }

        assert_eq!(channel.len(), 50);
        // 0 was dropped; 1..=50 retained in order.
        let mut remaining = Vec::new();
        while let Some(value) = channel.pop() {
            remaining.push(value);
        }
        assert_eq!(remaining, (1..=50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_publish_is_gated_by_stop() {
        let (pipeline, _) = collecting_pipeline(10);
        pipeline.publish(1);
        assert_eq!(pipeline.queued(), 0);

        pipeline.start();
        pipeline.publish(2);
        assert_eq!(pipeline.queued(), 1);

        pipeline.stop();
        pipeline.publish(3);
        assert_eq!(pipeline.queued(), 1);
    }

    #[tokio::test]
    async fn test_read_results_drains_in_one_cycle() {
        let (pipeline, seen) = collecting_pipeline(10);
        pipeline.start();
        for value in [10, 20, 30] {
            pipeline.publish(value);
        }

        let cancel = CancellationToken::new();
        let consumer = {
            let pipeline = Arc::clone(&pipeline);
            let cancel = cancel.clone();
            tokio::spawn(async move { pipeline.read_results(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);

        cancel.cancel();
        consumer.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_unblocks_parked_consumer() {
        let (pipeline, _) = collecting_pipeline(10);
        pipeline.start();

        let cancel = CancellationToken::new();
        let consumer = {
            let pipeline = Arc::clone(&pipeline);
            let cancel = cancel.clone();
            tokio::spawn(async move { pipeline.read_results(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer exits on cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_emit_failure_reaches_error_callback_and_drain_continues() {
        let errors = Arc::new(AtomicUsize::new(0));
        let emitted = Arc::new(AtomicUsize::new(0));

        let emitted_in = Arc::clone(&emitted);
        let on_emit: EmitFn<u32> = Arc::new(move |value| {
            if value == 1 {
                return Err(TelemetryError::Export("sink unavailable".to_string()));
            }
            emitted_in.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let errors_in = Arc::clone(&errors);
        let on_error: ErrorFn = Arc::new(move |_| {
            errors_in.fetch_add(1, Ordering::SeqCst);
        });

        let pipeline = Arc::new(Pipeline::new(10, on_emit, on_error));
        pipeline.start();
        pipeline.publish(1);
        pipeline.publish(2);

        let cancel = CancellationToken::new();
        let consumer = {
            let pipeline = Arc::clone(&pipeline);
            let cancel = cancel.clone();
            tokio::spawn(async move { pipeline.read_results(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(emitted.load(Ordering::SeqCst), 1);

        cancel.cancel();
        consumer.await.unwrap();
    }
}
