//! ISO-8601 date handling shared by the codec and the editor.
//!
//! Plist dates travel as `YYYY-MM-DDTHH:MM:SSZ`. Parsing is a little more
//! forgiving than formatting: offsets, fractional seconds, a space instead of
//! `T`, a missing zone (taken as UTC) and bare dates are all accepted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse date text, returning `None` when it is not a recognizable timestamp.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a timestamp the way plists store it: whole seconds, trailing `Z`.
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format(WIRE_FORMAT).to_string()
}

/// Drop sub-second precision.
pub fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Placeholder substituted for unparseable date text.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// The current time at plist precision.
pub fn now() -> DateTime<Utc> {
    truncate_to_seconds(Utc::now())
}
