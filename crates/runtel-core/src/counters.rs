//! Runtime counter contracts polled by the periodic samplers.
//!
//! Like the event provider, the runtime's counter surface is a black box:
//! the hosting application supplies implementations that read the managed
//! runtime's GC and worker-pool counters. Process-level counters need no
//! contract — they are read directly from the operating system.

use crate::stats::{CompactionMode, GcMode, LatencyMode};

/// Heap and collection counters of the monitored runtime.
pub trait GcCounterSource: Send + Sync {
    fn gc_mode(&self) -> GcMode;
    fn compaction_mode(&self) -> CompactionMode;
    fn latency_mode(&self) -> LatencyMode;
    /// Total committed heap size, bytes.
    fn heap_size(&self) -> u64;
    /// Number of collections observed for `generation` (0-2).
    fn collection_count(&self, generation: u32) -> u32;
    /// Size of `generation` in bytes; generation 3 is the large object heap.
    fn generation_size(&self, generation: u32) -> u64;
    /// Percentage of elapsed time the last collection spent in GC.
    fn time_in_gc_percent(&self) -> u32;
}

/// Worker-pool occupancy counters of the monitored runtime.
pub trait ThreadPoolCounterSource: Send + Sync {
    /// `(worker, io)` threads currently available.
    fn available_threads(&self) -> (u32, u32);
    /// `(worker, io)` thread limits.
    fn max_threads(&self) -> (u32, u32);
    fn thread_count(&self) -> u32;
    fn queue_length(&self) -> u64;
    fn completed_items_count(&self) -> u64;
    fn lock_contention_count(&self) -> u64;
}
