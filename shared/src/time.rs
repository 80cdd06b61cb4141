//! Timestamp parsing and formatting for the ISO-8601 strings stored in the
//! database and sent over the wire.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat, Utc};
use thiserror::Error;

/// A string that none of the accepted timestamp forms could read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp: {0:?}")]
pub struct TimestampError(pub String);

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a timestamp, keeping the offset it was written with.
///
/// Accepts RFC 3339 (`2025-05-19T08:30:26.195+02:00`), a naive date-time
/// (`2025-05-19T06:00:00`) and a plain date (`2025-05-19`). The last two carry
/// no offset and are read as `+00:00`.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, TimestampError> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed);
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| TimestampError(value.to_string()))?;

    Ok(DateTime::from_naive_utc_and_offset(naive, Utc.fix()))
}

/// Parse an optional timestamp field.
pub fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, TimestampError> {
    value.map(parse_timestamp).transpose()
}

/// Format a timestamp as RFC 3339 with millisecond precision and an explicit
/// offset.
pub fn format_timestamp(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Current time as a stored timestamp string.
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now().fixed_offset())
}
