use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio_util::sync::CancellationToken;

use super::{SamplerSchedule, SharedTimer};
use crate::error::{Result, TelemetryError};
use crate::pipeline::{EmitFn, ErrorFn, Pipeline};
use crate::stats::ProcessInfoStats;

static PROCESS_INFO_TIMER: SharedTimer = SharedTimer::new();

/// CPU usage is recomputed at most once per this window; sampling faster than
/// the window returns the previous figure, keeping the percentage stable.
const CPU_REFRESH_WINDOW: Duration = Duration::from_secs(1);

/// Reads the current process's counters from the operating system.
struct ProcessProbe {
    system: System,
    pid: Pid,
    cpu_count: f64,
    last_refresh: Instant,
    cpu_percent: f64,
}

impl ProcessProbe {
    fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|error| TelemetryError::Snapshot(error.to_string()))?;
        let cpu_count = std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1) as f64;
        Ok(Self {
            system: System::new(),
            pid,
            cpu_count,
            last_refresh: Instant::now(),
            cpu_percent: 0.0,
        })
    }

    fn sample(&mut self) -> Result<ProcessInfoStats> {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        let process = self.system.process(self.pid).ok_or_else(|| {
            TelemetryError::Snapshot(format!("process {} not found", self.pid))
        })?;

        let now = Instant::now();
        if now.duration_since(self.last_refresh) >= CPU_REFRESH_WINDOW {
            // cpu_usage is a percentage of a single core; normalize to total
            // machine capacity.
            self.cpu_percent = f64::from(process.cpu_usage()) / self.cpu_count;
            self.last_refresh = now;
        }

        Ok(ProcessInfoStats {
            date: Utc::now(),
            cpu_percent: self.cpu_percent,
            working_set: process.memory(),
            private_bytes: process.virtual_memory(),
        })
    }
}

/// Samples process CPU and memory counters on the shared process-info timer.
pub struct ProcessInfoSampler {
    pipeline: Arc<Pipeline<ProcessInfoStats>>,
    probe: Arc<Mutex<ProcessProbe>>,
    schedule: SamplerSchedule,
    registered: AtomicBool,
}

impl ProcessInfoSampler {
    pub fn new(
        schedule: SamplerSchedule,
        capacity: usize,
        on_emit: EmitFn<ProcessInfoStats>,
        on_error: ErrorFn,
    ) -> Result<Self> {
        Ok(Self {
            pipeline: Arc::new(Pipeline::new(capacity, on_emit, on_error)),
            probe: Arc::new(Mutex::new(ProcessProbe::new()?)),
            schedule,
            registered: AtomicBool::new(false),
        })
    }

    /// Enables publishing, registers this instance's tick callback on first
    /// start, and arms the shared timer if no other instance has. Must run
    /// inside a tokio runtime.
    pub fn start(&self) {
        self.pipeline.start();
        if !self.registered.swap(true, Ordering::SeqCst) {
            let pipeline = Arc::clone(&self.pipeline);
            let probe = Arc::clone(&self.probe);
            PROCESS_INFO_TIMER.register(Box::new(move || tick(&pipeline, &probe)));
        }
        PROCESS_INFO_TIMER.arm(self.schedule);
    }

    pub fn stop(&self) {
        self.pipeline.stop();
    }

    /// Process-wide teardown of the shared process-info timer; affects every
    /// coexisting `ProcessInfoSampler`.
    pub fn dispose(&self) {
        self.pipeline.stop();
        PROCESS_INFO_TIMER.dispose();
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

    #[cfg(test)]
    pub(crate) fn timer_armed() -> bool {
        PROCESS_INFO_TIMER.is_armed()
    }
}

fn tick(pipeline: &Pipeline<ProcessInfoStats>, probe: &Mutex<ProcessProbe>) {
    if !pipeline.enabled() {
        return;
    }
    match probe.lock().unwrap().sample() {
        Ok(stats) => pipeline.publish(stats),
        Err(error) => pipeline.report_error(error),
    }
}

#[cfg(test)]
mod tests {
    use super::super::timer_test_guard;
    use super::*;
    use crate::pipeline::DEFAULT_QUEUE_CAPACITY;

    #[test]
    fn test_probe_samples_current_process() {
        let mut probe = ProcessProbe::new().unwrap();
        let stats = probe.sample().unwrap();
        assert!(stats.working_set > 0);
        // CPU stays at its initial value until the refresh window elapses.
        assert_eq!(stats.cpu_percent, 0.0);
    }

    #[tokio::test]
    async fn test_sampler_publishes_on_ticks() {
        let _guard = timer_test_guard();

        let sampler = ProcessInfoSampler::new(
            SamplerSchedule::new(Duration::ZERO, Duration::from_millis(20)),
            DEFAULT_QUEUE_CAPACITY,
            Arc::new(|_| Ok(())),
            Arc::new(|_| {}),
        )
        .unwrap();

        sampler.start();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(sampler.queued() > 0);

        sampler.dispose();
        assert!(!ProcessInfoSampler::timer_armed());
    }
}
