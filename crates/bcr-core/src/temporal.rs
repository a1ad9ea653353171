//! # Temporal Types
//!
//! UTC-only timestamp type for the registry. Credentials carry unix
//! seconds; records carry full RFC 3339 timestamps. [`Timestamp`] bridges
//! both so that token expiry and record ordering use one clock source.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp.
///
/// Serializes to RFC 3339 (e.g., `2026-01-15T12:00:00Z`). Ordering is
/// chronological, which the lifecycle manager relies on when sorting
/// listings by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap an existing `chrono::DateTime<Utc>`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Build a timestamp from seconds since the unix epoch.
    ///
    /// Returns `None` for values chrono cannot represent.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Seconds since the unix epoch, truncating any subsecond part.
    pub fn unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Shift by a whole number of seconds. Saturates at chrono's range.
    pub fn plus_secs(&self, secs: i64) -> Self {
        let delta = chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX);
        Self(self.0.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_round_trip_truncates_to_seconds() {
        let ts = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        assert_eq!(ts.unix_secs(), 1_700_000_000);
        assert_eq!(ts.to_string(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn plus_secs_moves_forward() {
        let ts = Timestamp::from_unix_secs(100).unwrap();
        assert_eq!(ts.plus_secs(50).unix_secs(), 150);
        assert!(ts.plus_secs(1) > ts);
    }

    #[test]
    fn plus_secs_saturates() {
        let ts = Timestamp::now();
        let far = ts.plus_secs(i64::MAX);
        assert!(far > ts);
    }

    #[test]
    fn serde_is_transparent_rfc3339() {
        let ts = Timestamp::from_unix_secs(0).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
