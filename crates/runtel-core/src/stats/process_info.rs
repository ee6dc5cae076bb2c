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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Periodic snapshot of process-level counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfoStats {
    pub date: DateTime<Utc>,
    /// Process CPU usage as a percentage of total machine capacity, computed
    /// as a CPU-time delta over wall-clock time since the previous sample.
    pub cpu_percent: f64,
    /// Resident set: shared and private pages mapped by the process, bytes.
    pub working_set: u64,
    /// Memory not shareable with other processes, bytes.
    pub private_bytes: u64,
}
