// Copyright 2024 The Android Open Source Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Time Display class

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Timelike, Utc};

/// A simple class that contains information required to display time
pub struct TimeDisplay {
    /// seconds since std::time::UNIX_EPOCH
    secs: i64,
    /// nano sub seconds since std::time::UNIX_EPOCH
    nsecs: u32,
}

impl TimeDisplay {
    /// Creates a new TimeDisplay with given secs and nsecs
    pub fn new(secs: i64, nsecs: u32) -> TimeDisplay {
        TimeDisplay { secs, nsecs }
    }

    /// Displays time in UTC for logs
    pub fn utc_display_log(&self) -> String {
        if let Some(datetime) = DateTime::<Utc>::from_timestamp(self.secs, self.nsecs) {
            return format!(
                "{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
                datetime.month(),
                datetime.day(),
                datetime.hour(),
                datetime.minute(),
                datetime.second(),
                datetime.timestamp_subsec_millis(),
            );
        }
        "INVALID-TIMESTAMP".to_string()
    }
}

// Get TimeDisplay of current_time
fn get_current_time() -> TimeDisplay {
    let since_epoch =
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or(std::time::Duration::ZERO);
    TimeDisplay::new(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
}

/// Return the timestamp of the current time for logs
pub fn log_current_time() -> String {
    get_current_time().utc_display_log()
}
