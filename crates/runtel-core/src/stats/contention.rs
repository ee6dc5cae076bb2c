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

/// One lock-contention observation.
///
/// Raised whenever a thread waited for a monitor or native runtime lock held
/// by another thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentionStats {
    /// Event timestamp in 100 ns ticks.
    pub time: i64,
    /// 0: managed lock, 1: native lock.
    pub flag: u8,
    pub duration_ns: f64,
}

impl ContentionStats {
    /// Canonical label for the lock-kind flag.
    pub fn flag_label(&self) -> Result<&'static str> {
        match self.flag {
            0 => Ok("managed"),
            1 => Ok("native"),
            other => Err(TelemetryError::UnknownCode {
                what: "contention flag",
                code: u32::from(other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_labels() {
        let stat = ContentionStats {
            time: 0,
            flag: 0,
            duration_ns: 150.0,
        };
        assert_eq!(stat.flag_label().unwrap(), "managed");
        assert_eq!(
            ContentionStats { flag: 1, ..stat }.flag_label().unwrap(),
            "native"
        );
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let stat = ContentionStats {
            time: 0,
            flag: 9,
            duration_ns: 0.0,
        };
        assert_eq!(
            stat.flag_label(),
            Err(TelemetryError::UnknownCode {
                what: "contention flag",
                code: 9,
            })
        );
    }
}
