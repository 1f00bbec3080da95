//! Timestamp formatting shared by hash pre-images and wire serialization.
//!
//! Timestamps are RFC-3339 UTC strings with millisecond precision, e.g.
//! `2024-01-01T00:00:00.000Z`. The same rendering is used when hashing and
//! when serializing, so a record round-tripped through JSON re-hashes to the
//! same digest.

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp as RFC-3339 UTC with millisecond precision.
///
/// # Example
///
/// ```rust
/// use auditseal_canonical::format_ts;
/// use chrono::{TimeZone, Utc};
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(format_ts(&ts), "2024-01-01T00:00:00.000Z");
/// ```
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde helpers keeping `DateTime<Utc>` fields on the millisecond wire form.
///
/// Use with `#[serde(with = "auditseal_canonical::ts_millis")]`.
pub mod ts_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
