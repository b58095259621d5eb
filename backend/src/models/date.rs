//! Calendar-date parsing and rendering for exercise records.
//!
//! Three concerns live here:
//! - strict `YYYY-MM-DD` parsing used by the log date bounds,
//! - lenient free-form parsing for the date submitted with an exercise,
//! - the human-readable `Www Mmm DD YYYY` rendering used in responses.
//!
//! All dates are interpreted in UTC; a bare calendar date means midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Smallest all-digit value read as epoch milliseconds.
const EPOCH_MILLIS_MIN: i64 = 275_761;

/// Date-only formats accepted for a submitted exercise date.
const DATE_FORMATS: &[&str] = &[
    "%a %b %d %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
];

/// Date-time formats (without offset) accepted for a submitted exercise date.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse a `YYYY-MM-DD` calendar date.
///
/// The input is split on `-` into exactly three numeric components. Returns
/// `None` when a component is missing or non-numeric, or when the components
/// do not name a real calendar day (e.g. `2023-02-30`).
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.split('-');
    let year = parse_component::<i32>(parts.next()?)?;
    let month = parse_component::<u32>(parts.next()?)?;
    let day = parse_component::<u32>(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_component<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse a `YYYY-MM-DD` bound into the instant it compares against.
pub fn parse_date_bound(input: &str) -> Option<DateTime<Utc>> {
    parse_calendar_date(input).map(start_of_day)
}

/// Parse the free-form date submitted with an exercise.
///
/// Accepts integer milliseconds since the Unix epoch, a bare year, `YYYY-MM-DD`,
/// RFC 3339, RFC 2822, offset-less ISO date-times and a handful of written
/// forms such as `Sun Jan 15 2023` or `January 15, 2023`.
pub fn parse_exercise_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        return parse_numeric_date(input);
    }

    if let Some(date) = parse_calendar_date(input) {
        return Some(start_of_day(date));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .map(start_of_day)
        })
}

/// All-digit input: epoch milliseconds from [`EPOCH_MILLIS_MIN`] up, a
/// bare four-digit year (January 1) below that, anything else invalid.
fn parse_numeric_date(input: &str) -> Option<DateTime<Utc>> {
    let value = input.parse::<i64>().ok()?;
    if value >= EPOCH_MILLIS_MIN {
        return DateTime::from_timestamp_millis(value);
    }
    if input.len() == 4 {
        let year = i32::try_from(value).ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(start_of_day);
    }
    None
}

/// Render `date` as `Www Mmm DD YYYY`, e.g. `Sun Jan 15 2023`.
pub fn format_date_string(date: &DateTime<Utc>) -> String {
    date.format("%a %b %d %Y").to_string()
}

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;
