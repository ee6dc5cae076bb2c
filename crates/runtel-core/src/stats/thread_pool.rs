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

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};

/// Adjustment driven by the pool's hill-climbing heuristic; carries no
/// externally meaningful signal and is filtered out by the adapter.
pub const REASON_CLIMBING_MOVE: u32 = 3;

/// Demand for workers persistently exceeds supply. The single most actionable
/// signal this collector surfaces: runtime-driven pool growth under
/// starvation directly degrades host-wide latency.
pub const REASON_STARVATION: u32 = 6;

/// A worker-pool observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThreadPoolEvent {
    Worker(ThreadPoolWorkerStats),
    Adjustment(ThreadPoolAdjustmentStats),
    /// Extra high-severity notification emitted alongside an adjustment whose
    /// reason is [`REASON_STARVATION`].
    StarvationAlert(ThreadPoolAdjustmentStats),
}

/// Worker count at the time a worker thread stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadPoolWorkerStats {
    /// Event timestamp in 100 ns ticks.
    pub time: i64,
    /// Workers available to process work, including those already processing.
    pub active_workers: u32,
}

/// One pool-size adjustment decision made by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadPoolAdjustmentStats {
    /// Event timestamp in 100 ns ticks.
    pub time: i64,
    pub average_throughput: f64,
    pub new_worker_count: u32,
    pub reason: u32,
}

impl ThreadPoolAdjustmentStats {
    /// Canonical label for the adjustment reason.
    pub fn reason_label(&self) -> Result<&'static str> {
        match self.reason {
            0 => Ok("warmup"),
            1 => Ok("initializing"),
            2 => Ok("random_move"),
            3 => Ok("climbing_move"),
            4 => Ok("change_point"),
            5 => Ok("stabilizing"),
            6 => Ok("starvation"),
            7 => Ok("timedout"),
            code => Err(TelemetryError::UnknownCode {
                what: "threadpool adjustment reason",
                code,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_reason_labels() {
        let mut stat = ThreadPoolAdjustmentStats {
            time: 0,
            average_throughput: 12.5,
            new_worker_count: 8,
            reason: REASON_STARVATION,
        };
        assert_eq!(stat.reason_label().unwrap(), "starvation");

        stat.reason = REASON_CLIMBING_MOVE;
        assert_eq!(stat.reason_label().unwrap(), "climbing_move");

        stat.reason = 8;
        assert_eq!(
            stat.reason_label(),
            Err(TelemetryError::UnknownCode {
                what: "threadpool adjustment reason",
                code: 8,
            })
        );
    }
}
