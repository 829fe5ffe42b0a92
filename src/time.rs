//! Time conversion helpers.
//!
//! All wire timestamps are Unix milliseconds; public structs carry
//! `chrono::DateTime<Utc>`. The exchange reports event times as float
//! milliseconds in some payloads, so conversion from `f64` is fallible.

use crate::error::{ParseError, Result};
use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Largest receive window the exchange accepts, in milliseconds.
pub const MAX_RECV_WINDOW_MS: i64 = 60_000;

/// Returns the current time in milliseconds since the Unix epoch.
#[inline]
pub fn milliseconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as i64
}

/// Converts a `DateTime<Utc>` to Unix milliseconds for the wire.
#[inline]
pub fn unix_millis(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

/// Converts a receive window duration to milliseconds, clamped to the
/// exchange-accepted range of 1 to 60 000 ms.
pub fn recv_window_millis(window: Duration) -> i64 {
    (window.as_millis() as i64).clamp(1, MAX_RECV_WINDOW_MS)
}

/// Converts a float Unix-millisecond timestamp, as reported in order and
/// trade payloads, into a `DateTime<Utc>`.
///
/// # Errors
///
/// Returns a [`ParseError::Timestamp`] if the value is not finite, is
/// negative, or is outside the range `chrono` can represent.
pub fn time_from_unix_timestamp_float(value: f64) -> Result<DateTime<Utc>> {
    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::timestamp(format!(
            "timestamp {value} is not a valid Unix millisecond value"
        ))
        .into());
    }

    let millis = value as i64;
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        ParseError::timestamp(format!("timestamp {millis}ms is out of range")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_milliseconds() {
        let now = milliseconds();
        assert!(now > 1_600_000_000_000); // after 2020
        assert!(now < 2_000_000_000_000); // before 2033
    }

    #[test]
    fn test_unix_millis() {
        let t = Utc.with_ymd_and_hms(2020, 9, 13, 12, 26, 40).unwrap();
        assert_eq!(unix_millis(t), 1_600_000_000_000);
    }

    #[test]
    fn test_recv_window_millis_clamps() {
        assert_eq!(recv_window_millis(Duration::from_millis(5000)), 5000);
        assert_eq!(recv_window_millis(Duration::from_secs(120)), 60_000);
        assert_eq!(recv_window_millis(Duration::ZERO), 1);
    }

    #[test]
    fn test_time_from_unix_timestamp_float() {
        let t = time_from_unix_timestamp_float(1_600_000_000_000.0).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 9, 13, 12, 26, 40).unwrap());
    }

    #[test]
    fn test_time_from_unix_timestamp_float_rejects_nan() {
        assert!(time_from_unix_timestamp_float(f64::NAN).is_err());
        assert!(time_from_unix_timestamp_float(f64::INFINITY).is_err());
        assert!(time_from_unix_timestamp_float(-1.0).is_err());
    }

    #[test]
    fn test_round_trip() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let millis = unix_millis(t);
        let back = time_from_unix_timestamp_float(millis as f64).unwrap();
        assert_eq!(t, back);
    }
}
