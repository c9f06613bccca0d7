//! Time utilities with a clock abstraction for testability.
//!
//! Timestamps are Unix epoch milliseconds; they are rendered in JST (UTC+9).

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Source of "now" for anything that stamps events.
pub trait Clock: Send + Sync {
    /// Current Unix timestamp in milliseconds
    fn now_millis(&self) -> i64;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: i64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_time: fixed_time_millis,
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_time
    }
}

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn to_jst(timestamp_millis: i64) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(JST_OFFSET_SECS)?
        .timestamp_millis_opt(timestamp_millis)
        .single()
}

/// Convert a Unix timestamp (milliseconds) to RFC 3339 in JST.
///
/// Out-of-range values fall back to the raw number.
pub fn timestamp_to_jst_rfc3339(timestamp_millis: i64) -> String {
    to_jst(timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp_millis.to_string())
}

/// Convert a Unix timestamp (milliseconds) to `HH:MM:SS` in JST.
pub fn timestamp_to_jst_clock(timestamp_millis: i64) -> String {
    to_jst(timestamp_millis)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
