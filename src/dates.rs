//! Timestamp helpers
//!
//! Messages carry their timestamps as ISO-8601 strings. Parsing is lenient:
//! anything that cannot be read as a date becomes the current time, so a
//! corrupted record never prevents a conversation from being shown.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::fmt::Display;

/// Current time as an ISO-8601 string with millisecond precision
///
/// # Examples
///
/// ```
/// use emobuddy::dates::now_timestamp;
///
/// let ts = now_timestamp();
/// assert!(ts.ends_with('Z'));
/// assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
/// ```
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a timestamp string, falling back to the current time
///
/// Accepts RFC 3339 (`2024-05-01T10:20:30.123Z`, `2024-05-01T12:20:30+02:00`),
/// a zone-less date-time which is read as UTC, and a bare `YYYY-MM-DD` date
/// which is read as midnight UTC.
///
/// # Examples
///
/// ```
/// use emobuddy::dates::parse_timestamp;
///
/// let dt = parse_timestamp("2024-05-01T10:20:30Z");
/// assert_eq!(dt.to_rfc3339(), "2024-05-01T10:20:30+00:00");
///
/// // Garbage never panics.
/// let _now = parse_timestamp("not-a-date");
/// ```
pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Utc.from_utc_datetime(&naive);
    }

    if let Some(naive) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Utc.from_utc_datetime(&naive);
    }

    tracing::debug!("Unparseable timestamp {:?}, using current time", value);
    Utc::now()
}

/// Format a timestamp for display as day, full month name and 24-hour time
///
/// The output is rendered in whatever zone `dt` carries.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use emobuddy::dates::format_timestamp;
///
/// let dt = Utc.with_ymd_and_hms(2024, 10, 5, 14, 7, 0).unwrap();
/// assert_eq!(format_timestamp(&dt), "October 5, 14:07");
/// ```
pub fn format_timestamp<Tz>(dt: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.format("%B %-d, %H:%M").to_string()
}

/// Format a UTC instant in the machine's local zone
pub fn format_local(dt: &DateTime<Utc>) -> String {
    format_timestamp(&dt.with_timezone(&Local))
}
