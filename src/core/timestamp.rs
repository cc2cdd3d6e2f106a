//! Timestamp formatting for the JSON wire format
//!
//! Every variant is RFC 3339 in UTC with a `Z` suffix, so any of them can be
//! parsed back with `DateTime::parse_from_rfc3339`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// RFC 3339 precision used for the `timestamp` key
///
/// # Examples
///
/// ```
/// use fanout_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Rfc3339.format(&at), "2025-01-08T10:30:45Z");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// Whole seconds: `2025-01-08T10:30:45Z`
    #[default]
    Rfc3339,

    /// Milliseconds: `2025-01-08T10:30:45.123Z`
    Rfc3339Millis,

    /// Microseconds: `2025-01-08T10:30:45.123456Z`
    ///
    /// Provides higher precision for ordering concurrent log entries.
    Rfc3339Micros,
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        let precision = match self {
            TimestampFormat::Rfc3339 => SecondsFormat::Secs,
            TimestampFormat::Rfc3339Millis => SecondsFormat::Millis,
            TimestampFormat::Rfc3339Micros => SecondsFormat::Micros,
        };
        datetime.to_rfc3339_opts(precision, true)
    }
}
