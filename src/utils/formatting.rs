//! Date formatting utilities
//!
//! Turns dates, epoch-millisecond timestamps and date strings into
//! `YYYY-MM-DD` calendar days in UTC.

use crate::error::{HelperError, HelperResult};
use crate::value::Value;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

/// Largest distance from the epoch, in milliseconds, a date may have
/// (100,000,000 days either side). Instants past chrono's own year range
/// are rejected as well.
pub const MAX_EPOCH_MILLIS: i64 = 8_640_000_000_000_000;

/// Date-time layouts without an offset; these are read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Formats a value as a `YYYY-MM-DD` calendar day in UTC
///
/// Accepts a [`Value::Date`], a [`Value::Number`] of milliseconds since
/// the epoch (fraction truncated), or a [`Value::String`] understood by
/// [`parse_instant`]. `Null` and `false` count as 0 ms and `true` as 1 ms.
///
/// # Errors
/// Returns [`HelperError::InvalidInput`] for undefined, arrays, objects, strings
/// that do not parse, for non-finite numbers, and for instants further than
/// [`MAX_EPOCH_MILLIS`] from the epoch.
pub fn format_date(input: &Value) -> HelperResult<String> {
    let instant = match input {
        Value::Date(date) => Some(date.instant()),
        Value::Number(millis) => instant_from_millis(*millis),
        Value::String(text) => parse_instant(text),
        Value::Null | Value::Bool(false) => instant_from_millis(0.0),
        Value::Bool(true) => instant_from_millis(1.0),
        Value::Undefined | Value::Array(_) | Value::Object(_) => None,
    };

    match instant.filter(is_within_range) {
        Some(instant) => Ok(format_instant(instant)),
        None => {
            debug!(kind = input.type_name(), "rejected date input");
            Err(HelperError::InvalidInput(describe(input)))
        }
    }
}

/// Renders an instant as its UTC calendar day
///
/// Years outside `0000..=9999` use the expanded form: a sign and six
/// digits, e.g. `+010000-01-01` or `-000001-01-01`.
pub fn format_instant(instant: DateTime<Utc>) -> String {
    let year = instant.year();
    if (0..=9999).contains(&year) {
        return instant.format("%Y-%m-%d").to_string();
    }

    let sign = if year < 0 { '-' } else { '+' };
    format!(
        "{}{:06}-{:02}-{:02}",
        sign,
        year.unsigned_abs(),
        instant.month(),
        instant.day()
    )
}

/// Parses a date string into an instant
///
/// Leading and trailing whitespace is ignored. Recognized forms:
/// - RFC 3339 date-times, e.g. `2025-11-17T12:00:00Z` or `...+02:00`
/// - date-times without an offset (`2025-11-17T12:00`, `2025-11-17 12:00:00.5`),
///   read as UTC
/// - `YYYY-MM-DD`, `YYYY-MM` and `YYYY`, at UTC midnight
/// - RFC 2822, e.g. `Mon, 17 Nov 2025 12:00:00 +0000`
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    if let Some(day) = parse_calendar_day(text) {
        return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`
fn parse_calendar_day(text: &str) -> Option<NaiveDate> {
    let mut parts = text.split('-');
    let year = parse_digits(parts.next()?, 4)?;
    let month = match parts.next() {
        Some(part) => parse_digits(part, 2)?,
        None => 1,
    };
    let day = match parts.next() {
        Some(part) => parse_digits(part, 2)?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn parse_digits(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn instant_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis.trunc() as i64)
}

fn is_within_range(instant: &DateTime<Utc>) -> bool {
    instant.timestamp_millis().abs() <= MAX_EPOCH_MILLIS
}

fn describe(input: &Value) -> String {
    match input {
        Value::String(text) => format!("{:?}", text),
        Value::Number(number) => number.to_string(),
        other => other.type_name().to_string(),
    }
}
