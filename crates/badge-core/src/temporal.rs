//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` renders as `YYYY-MM-DDTHH:MM:SSZ`: UTC, `Z` suffix, no
//! sub-seconds. Credential `validFrom`/`validUntil` and proof `created`
//! fields all use this form so canonical bytes are stable for one instant.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serde goes through [`Timestamp::to_iso8601`] and [`Timestamp::parse`], so
/// deserialized values obey the same rules as parsed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 timestamp.
    ///
    /// Only the `Z` suffix is accepted; explicit offsets, even `+00:00`, are
    /// rejected.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ValidationError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("invalid Unix timestamp: {secs}")))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO 8601 with `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_with_z_suffix_and_no_subseconds() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
            + chrono::Duration::milliseconds(750);
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:00:00Z");
        assert_eq!(ts.to_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn serde_form_matches_iso8601() {
        let ts = Timestamp::parse("2026-03-01T09:30:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2026-03-01T09:30:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn deserialize_truncates_subseconds() {
        let ts: Timestamp = serde_json::from_str("\"2027-01-01T00:00:00.5Z\"").unwrap();
        assert_eq!(ts.to_iso8601(), "2027-01-01T00:00:00Z");
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"2027-01-01T00:00:00Z\"");
    }

    #[test]
    fn deserialize_rejects_offsets() {
        assert!(serde_json::from_str::<Timestamp>("\"2027-01-01T00:00:00+00:00\"").is_err());
    }

    #[test]
    fn parse_rejects_offsets() {
        assert!(Timestamp::parse("2026-01-15T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2026-01-15T12:00:00+05:30").is_err());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            Timestamp::parse("yesterdayZ"),
            Err(ValidationError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn epoch_round_trip() {
        let ts = Timestamp::from_epoch_secs(1_767_225_600).unwrap();
        assert_eq!(ts.epoch_secs(), 1_767_225_600);
        assert_eq!(ts.to_iso8601(), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn ordering_follows_time() {
        let a = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let b = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
        assert!(a < b);
    }
}
