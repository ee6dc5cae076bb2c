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

//! Typed statistics records, one per observation kind.
//!
//! All records are immutable values: created at event/sample time, passed by
//! value through a bounded queue, consumed once and discarded. Discrete
//! reason fields keep the provider's raw numeric code; canonical string
//! labels come from fallible `*_label` translation functions so an
//! undocumented code surfaces as [`TelemetryError::UnknownCode`] instead of
//! being silently mislabeled.
//!
//! [`TelemetryError::UnknownCode`]: crate::error::TelemetryError::UnknownCode

mod contention;
mod gc_event;
mod gc_info;
mod process_info;
mod thread_info;
mod thread_pool;

pub use contention::ContentionStats;
pub use gc_event::{GcEvent, GcStartEndStats, GcSuspendStats};
pub use gc_info::{CompactionMode, GcInfoStats, GcMode, LatencyMode};
pub use process_info::ProcessInfoStats;
pub use thread_info::ThreadInfoStats;
pub use thread_pool::{
    ThreadPoolAdjustmentStats, ThreadPoolEvent, ThreadPoolWorkerStats, REASON_CLIMBING_MOVE,
    REASON_STARVATION,
};
