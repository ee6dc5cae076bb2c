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

/// Periodic snapshot of worker-pool occupancy counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreadInfoStats {
    pub date: DateTime<Utc>,
    pub available_worker_threads: u32,
    pub available_io_threads: u32,
    pub max_worker_threads: u32,
    pub max_io_threads: u32,
    pub thread_count: u32,
    pub queue_length: u64,
    pub completed_items_count: u64,
    pub lock_contention_count: u64,
}

impl ThreadInfoStats {
    /// Worker threads currently in use.
    pub fn using_worker_threads(&self) -> u32 {
        self.max_worker_threads
            .saturating_sub(self.available_worker_threads)
    }

    /// I/O threads currently in use.
    pub fn using_io_threads(&self) -> u32 {
        self.max_io_threads.saturating_sub(self.available_io_threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_using_thread_counts() {
        let stat = ThreadInfoStats {
            date: Utc::now(),
            available_worker_threads: 30,
            available_io_threads: 98,
            max_worker_threads: 32,
            max_io_threads: 100,
            thread_count: 12,
            queue_length: 3,
            completed_items_count: 1000,
            lock_contention_count: 4,
        };
        assert_eq!(stat.using_worker_threads(), 2);
        assert_eq!(stat.using_io_threads(), 2);
    }
}
