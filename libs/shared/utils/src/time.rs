//! Display formatting for appointment times.

use chrono::{DateTime, TimeZone};

/// `"Mon, Dec 25 at 10:00 AM"`
pub fn format_local_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%a, %b %-d at %-I:%M %p").to_string()
}

/// `"12/25/2024, 10:00:00 AM"`, the en-US locale rendering used in emails.
pub fn format_locale_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Parses an RFC 3339 string and renders it with `format_locale_timestamp`;
/// anything unparseable is returned as given.
pub fn format_locale_timestamp_str(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|time| format_locale_timestamp(&time))
        .unwrap_or_else(|_| raw.to_string())
}
