//! Timestamp storage encoding.
//!
//! Every timestamp column is a BIGINT of microseconds since the Unix epoch.
//! The `Any` driver has no portable date-time type, and integer micros sort
//! and compare identically on all three engines.

use chrono::{DateTime, Utc};

/// Current time truncated to microsecond precision, so values read back
/// from storage compare equal to what was written.
pub fn now() -> DateTime<Utc> {
    from_micros(Utc::now().timestamp_micros())
}

pub fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

/// Decodes a stored value; out-of-range inputs clamp to the epoch.
pub fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or(DateTime::UNIX_EPOCH)
}
