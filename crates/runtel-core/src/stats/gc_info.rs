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

use crate::error::{Result, TelemetryError};

/// Whether the runtime's collector runs in workstation or server mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GcMode {
    Workstation = 0,
    Server = 1,
}

impl GcMode {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Workstation),
            1 => Ok(Self::Server),
            code => Err(TelemetryError::UnknownCode {
                what: "gc mode",
                code,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Workstation => "Workstation",
            Self::Server => "Server",
        }
    }
}

/// Large-object-heap compaction setting at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompactionMode {
    /// Non-compacting.
    Default = 0,
    /// Compact on the next collection, then reset to `Default`.
    CompactOnce = 1,
}

impl CompactionMode {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::CompactOnce),
            code => Err(TelemetryError::UnknownCode {
                what: "compaction mode",
                code,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::CompactOnce => "CompactOnce",
        }
    }
}

/// Collector latency setting at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatencyMode {
    Batch = 0,
    Interactive = 1,
    LowLatency = 2,
    SustainedLowLatency = 3,
    /// Reported by the runtime while a no-GC region is active; not settable.
    NoGcRegion = 4,
}

impl LatencyMode {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Batch),
            1 => Ok(Self::Interactive),
            2 => Ok(Self::LowLatency),
            3 => Ok(Self::SustainedLowLatency),
            4 => Ok(Self::NoGcRegion),
            code => Err(TelemetryError::UnknownCode {
                what: "latency mode",
                code,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Batch => "Batch",
            Self::Interactive => "Interactive",
            Self::LowLatency => "LowLatency",
            Self::SustainedLowLatency => "SustainedLowLatency",
            Self::NoGcRegion => "NoGCRegion",
        }
    }
}

/// Periodic snapshot of heap and collection counters.
///
/// Sizes are in bytes; `time_in_gc_percent` is the percentage of elapsed time
/// the last collection spent inside the collector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcInfoStats {
    pub date: DateTime<Utc>,
    pub gc_mode: GcMode,
    pub compaction_mode: CompactionMode,
    pub latency_mode: LatencyMode,
    pub heap_size: u64,
    pub gen0_count: u32,
    pub gen1_count: u32,
    pub gen2_count: u32,
    pub time_in_gc_percent: u32,
    pub gen0_size: u64,
    pub gen1_size: u64,
    pub gen2_size: u64,
    pub loh_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(GcMode::Workstation.label(), "Workstation");
        assert_eq!(GcMode::Server.label(), "Server");
        assert_eq!(CompactionMode::CompactOnce.label(), "CompactOnce");
        assert_eq!(LatencyMode::SustainedLowLatency.label(), "SustainedLowLatency");
        assert_eq!(LatencyMode::NoGcRegion.label(), "NoGCRegion");
    }

    #[test]
    fn test_mode_decoding_rejects_unknown_codes() {
        assert_eq!(GcMode::from_code(1).unwrap(), GcMode::Server);
        assert_eq!(
            GcMode::from_code(2),
            Err(TelemetryError::UnknownCode {
                what: "gc mode",
                code: 2,
            })
        );
        assert_eq!(
            LatencyMode::from_code(9),
            Err(TelemetryError::UnknownCode {
                what: "latency mode",
                code: 9,
            })
        );
        assert_eq!(
            CompactionMode::from_code(7),
            Err(TelemetryError::UnknownCode {
                what: "compaction mode",
                code: 7,
            })
        );
    }
}
