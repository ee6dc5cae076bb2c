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

/// A correlated garbage-collection observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GcEvent {
    StartEnd(GcStartEndStats),
    Suspend(GcSuspendStats),
}

/// One completed GC cycle, correlated from a start/end event pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcStartEndStats {
    pub index: u32,
    /// 0: blocking outside background GC, 1: background, 2: blocking during
    /// background GC.
    pub gc_type: u32,
    /// Generation 0-2.
    pub generation: u32,
    pub reason: u32,
    pub duration_ms: f64,
    /// Start timestamp in 100 ns ticks.
    pub start_time: i64,
    /// End timestamp in 100 ns ticks.
    pub end_time: i64,
}

impl GcStartEndStats {
    /// Canonical label for the collection trigger reason.
    pub fn reason_label(&self) -> Result<&'static str> {
        match self.reason {
            0 => Ok("soh"),
            1 => Ok("induced"),
            2 => Ok("low_memory"),
            3 => Ok("empty"),
            4 => Ok("loh"),
            5 => Ok("oos_soh"),
            6 => Ok("oos_loh"),
            7 => Ok("incuded_non_forceblock"),
            code => Err(TelemetryError::UnknownCode {
                what: "gc reason",
                code,
            }),
        }
    }
}

/// One runtime suspension window around GC work, correlated from a
/// suspend-begin/resume-end event pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GcSuspendStats {
    pub duration_ms: f64,
    pub reason: u32,
    pub count: u32,
}

impl GcSuspendStats {
    /// Canonical label for the suspension reason.
    pub fn reason_label(&self) -> Result<&'static str> {
        match self.reason {
            0 => Ok("other"),
            1 => Ok("gc"),
            2 => Ok("appdomain_shudown"),
            3 => Ok("code_pitch"),
            4 => Ok("shutdown"),
            5 => Ok("debugger"),
            6 => Ok("prep_gc"),
            code => Err(TelemetryError::UnknownCode {
                what: "gc suspend reason",
                code,
            }),
        }
    }
}
