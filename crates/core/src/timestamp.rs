//! Timestamp formatting for log rows.

use chrono::{DateTime, TimeZone};

/// Format used for the timestamp column, e.g. `10/18/2026, 3:04:05 PM`.
///
/// The meridiem is preceded by U+202F (narrow no-break space), as in the
/// `en-US` locale output of current ICU releases.
pub const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S\u{202f}%p";

/// Renders a timestamp in the US display format used by the sheet.
#[must_use]
pub fn display<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(DISPLAY_FORMAT).to_string()
}
