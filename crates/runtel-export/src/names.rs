//! Metric names emitted by the built-in exporter profiles.
//!
//! Event metrics carry labels drawn from the closed enumerations on the
//! statistics records:
//!
//! - `contention_type:managed|native`
//! - `gc_gen:0|1|2`, `gc_type:<code>`,
//!   `gc_reason:soh|induced|low_memory|empty|loh|oos_soh|oos_loh|incuded_non_forceblock`
//! - `gc_suspend_reason:other|gc|appdomain_shudown|code_pitch|shutdown|debugger|prep_gc`
//! - `threadpool_adjustment_reason:warmup|initializing|random_move|climbing_move|change_point|stabilizing|starvation|timedout`
//!
//! Timer metrics for GC carry `gc_gen:0|1|2|loh` plus `gc_mode:`,
//! `latency_mode:` and `compaction_mode:` labels.

pub const CONTENTION_STARTEND_COUNT: &str = "runtime_diagnostics_event.contention.startend_count";
pub const CONTENTION_STARTEND_DURATION_NS: &str =
    "runtime_diagnostics_event.contention.startend_duration_ns";

pub const GC_STARTEND_COUNT: &str = "runtime_diagnostics_event.gc.startend_count";
pub const GC_STARTEND_DURATION_MS: &str = "runtime_diagnostics_event.gc.startend_duration_ms";
pub const GC_SUSPEND_OBJECT_COUNT: &str = "runtime_diagnostics_event.gc.suspend_object_count";
pub const GC_SUSPEND_DURATION_MS: &str = "runtime_diagnostics_event.gc.suspend_duration_ms";

pub const THREADPOOL_AVAILABLE_WORKERTHREAD_COUNT: &str =
    "runtime_diagnostics_event.threadpool.available_workerthread_count";
pub const THREADPOOL_ADJUSTMENT_AVG_THROUGHPUT: &str =
    "runtime_diagnostics_event.threadpool.adjustment_avg_throughput";
pub const THREADPOOL_ADJUSTMENT_NEW_WORKERTHREADS_COUNT: &str =
    "runtime_diagnostics_event.threadpool.adjustment_new_workerthreads_count";
pub const THREADPOOL_STARVATION_COUNT: &str =
    "runtime_diagnostics_event.threadpool.starvation_count";

pub const TIMER_GC_HEAP_SIZE_BYTES: &str = "runtime_diagnostics_timer.gc.heap_size_bytes";
pub const TIMER_GC_COUNT: &str = "runtime_diagnostics_timer.gc.gc_count";
pub const TIMER_GC_SIZE: &str = "runtime_diagnostics_timer.gc.gc_size";
pub const TIMER_GC_TIME_IN_GC_PERCENT: &str = "runtime_diagnostics_timer.gc.time_in_gc_percent";

pub const TIMER_PROCESS_CPU: &str = "runtime_diagnostics_timer.process.cpu";
pub const TIMER_PROCESS_PRIVATE_BYTES: &str = "runtime_diagnostics_timer.process.private_bytes";
pub const TIMER_PROCESS_WORKING_SETS: &str = "runtime_diagnostics_timer.process.working_sets";

pub const TIMER_THREAD_AVAILABLE_WORKER_THREADS: &str =
    "runtime_diagnostics_timer.thread.available_worker_threads";
pub const TIMER_THREAD_AVAILABLE_COMPLETION_PORT_THREADS: &str =
    "runtime_diagnostics_timer.thread.available_completion_port_threads";
pub const TIMER_THREAD_MAX_WORKER_THREADS: &str =
    "runtime_diagnostics_timer.thread.max_worker_threads";
pub const TIMER_THREAD_MAX_COMPLETION_PORT_THREADS: &str =
    "runtime_diagnostics_timer.thread.max_completion_port_threads";
pub const TIMER_THREAD_USING_WORKER_THREADS: &str =
    "runtime_diagnostics_timer.thread.using_worker_threads";
pub const TIMER_THREAD_USING_COMPLETION_PORT_THREADS: &str =
    "runtime_diagnostics_timer.thread.using_completion_port_threads";
pub const TIMER_THREAD_THREAD_COUNT: &str = "runtime_diagnostics_timer.thread.thread_count";
pub const TIMER_THREAD_QUEUE_LENGTH: &str = "runtime_diagnostics_timer.thread.queue_length";
pub const TIMER_THREAD_LOCK_CONTENTION_COUNT: &str =
    "runtime_diagnostics_timer.thread.lock_contention_count";
pub const TIMER_THREAD_COMPLETED_ITEMS_COUNT: &str =
    "runtime_diagnostics_timer.thread.completed_items_count";
