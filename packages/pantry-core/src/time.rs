//! Timestamp helpers.
//!
//! Edge timestamps travel as RFC 3339 strings (the backend's `timestamptz`
//! rendering). Locally written timestamps use a fixed-width UTC form so that
//! lexical order equals chronological order inside SQLite.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returns the current time as a fixed-width RFC 3339 UTC string.
pub fn now_rfc3339() -> String {
    format_rfc3339(Utc::now())
}

/// Formats a UTC instant with microsecond precision and a `Z` suffix.
pub fn format_rfc3339(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses an RFC 3339 timestamp, normalizing to UTC.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
