// Copyright 2026 Runtel Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{Result, TelemetryError};
use crate::stats::{
    ContentionStats, GcInfoStats, GcStartEndStats, GcSuspendStats, ProcessInfoStats,
    ThreadInfoStats, ThreadPoolAdjustmentStats, ThreadPoolWorkerStats,
};

/// Exporter contract: one method per statistic kind.
///
/// Implementations translate each statistic into their sink's vocabulary
/// (metric emission calls, structured log lines, a user-defined destination).
/// A returned `Err` is caught at the dispatch boundary and routed to
/// [`StatsHandler::on_error`]; it never unwinds into the instrumentation
/// provider's dispatch thread, and the offending statistic is dropped.
pub trait StatsHandler: Send + Sync {
    fn on_contention_event(&self, stats: &ContentionStats) -> Result<()>;
    fn on_gc_start_end(&self, stats: &GcStartEndStats) -> Result<()>;
    fn on_gc_suspend(&self, stats: &GcSuspendStats) -> Result<()>;
    fn on_thread_pool_worker(&self, stats: &ThreadPoolWorkerStats) -> Result<()>;
    fn on_thread_pool_adjustment(&self, stats: &ThreadPoolAdjustmentStats) -> Result<()>;
    /// Called once per starvation adjustment, in addition to
    /// [`StatsHandler::on_thread_pool_adjustment`].
    fn on_starvation_alert(&self, stats: &ThreadPoolAdjustmentStats) -> Result<()>;
    fn on_gc_info(&self, stats: &GcInfoStats) -> Result<()>;
    fn on_process_info(&self, stats: &ProcessInfoStats) -> Result<()>;
    fn on_thread_info(&self, stats: &ThreadInfoStats) -> Result<()>;
    /// Receives every parse, snapshot and exporter error raised by the
    /// pipeline. Must not panic.
    fn on_error(&self, error: &TelemetryError);
}
