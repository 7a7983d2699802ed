//! Timestamp normalization for upstream feeds.
//!
//! The GPS feed emits UTC timestamps that sometimes lack an explicit `Z`
//! suffix or offset. A timestamp with no marker must be treated as UTC, not
//! local time, so normalization appends the marker before parsing.

use chrono::{DateTime, Utc};

use crate::error::{EngineError, Result};

/// Parse a feed timestamp, treating a missing zone marker as UTC.
///
/// Accepts RFC 3339 (`2024-06-03T09:05:00Z`, `2024-06-03T09:05:00-05:00`,
/// fractional seconds included) and the legacy space-separated form
/// (`2024-06-03 09:05:00`). A timestamp with no `Z` and no offset gets `Z`
/// appended before parsing.
///
/// # Errors
///
/// Returns [`EngineError::InvalidTimestamp`] when the input cannot be parsed
/// after normalization.
///
/// # Example
/// ```
/// use fieldtrace::parse_utc;
///
/// let a = parse_utc("2024-06-03T09:05:00").unwrap();
/// let b = parse_utc("2024-06-03T09:05:00Z").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();

    // Legacy feeds separate date and time with a space instead of 'T'.
    let mut candidate = trimmed.replacen(' ', "T", 1);

    if !has_zone_marker(&candidate) {
        candidate.push('Z');
    }

    DateTime::parse_from_rfc3339(&candidate)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| EngineError::InvalidTimestamp {
            raw: raw.to_string(),
            source,
        })
}

/// Whether the timestamp already carries a `Z` suffix or an explicit offset.
///
/// Only the time portion (after the date/time separator) is inspected, so the
/// hyphens in the date part are not mistaken for a negative offset.
fn has_zone_marker(value: &str) -> bool {
    if value.ends_with('Z') || value.ends_with('z') {
        return true;
    }
    let time_part = match value.split_once('T') {
        Some((_, time)) => time,
        None => return false,
    };
    time_part.contains('+') || time_part.contains('-')
}
