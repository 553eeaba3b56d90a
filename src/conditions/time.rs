//! permissive date and clock parsing for date_range / time_range rules
//!
//! supports formats:
//! - dates: "2016/01/30", "2016/01/30 15:10", "2016/1", "16/01/30"
//! - clock times: "15:10", "9", "9:5"
//! - day lists: "1, 3, 5" (0 = sunday .. 6 = saturday)
//!
//! parsing never fails: any missing, empty, zero or non-numeric fragment
//! falls back to its default. out-of-range components roll over into the
//! next unit the way a calendar normalizer would (month 13 is january of the
//! following year, 25:00 is 01:00 the next day).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

pub const DEFAULT_YEAR: i64 = 2000;
pub const DEFAULT_MONTH: i64 = 1;
pub const DEFAULT_DAY: i64 = 1;

/// read one numeric fragment, falling back to `default`
///
/// empty and "0" fragments are treated as unset, decimals are truncated
fn fragment(part: Option<&str>, default: i64) -> i64 {
    let part = match part.map(str::trim) {
        Some(p) if !p.is_empty() && p != "0" => p,
        _ => return default,
    };

    if let Ok(n) = part.parse::<i64>() {
        return n;
    }

    match part.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
        _ => default,
    }
}

/// two-digit years map into 1970-2069
fn expand_year(year: i64) -> i64 {
    match year {
        0..=69 => year + 2000,
        70..=100 => year + 1900,
        _ => year,
    }
}

/// build a timestamp from possibly out-of-range components
///
/// returns `None` only when the result leaves the representable range
pub fn make_time(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Option<NaiveDateTime> {
    let months = expand_year(year).checked_mul(12)?.checked_add(month.checked_sub(1)?)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = months.rem_euclid(12) as u32 + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    first
        .checked_add_signed(Duration::try_days(day.checked_sub(1)?)?)?
        .checked_add_signed(Duration::try_hours(hour)?)?
        .checked_add_signed(Duration::try_minutes(minute)?)?
        .checked_add_signed(Duration::try_seconds(second)?)
}

/// timestamp for a clock time on the given day, rolling over past midnight
pub fn on_day(day: NaiveDate, hour: i64, minute: i64, second: i64) -> Option<NaiveDateTime> {
    make_time(
        day.year() as i64,
        day.month() as i64,
        day.day() as i64,
        hour,
        minute,
        second,
    )
}

/// parse "hour:minute" into (hour, minute), defaulting each part to 0
pub fn parse_clock(s: &str) -> (i64, i64) {
    let mut parts = s.trim().split(':');
    let hour = fragment(parts.next(), 0);
    let minute = fragment(parts.next(), 0);
    (hour, minute)
}

/// parse "year/month/day[ hour:minute]"
///
/// returns `None` only when the components overflow the calendar
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let mut date_time = s.trim().split(' ');

    let mut date = date_time.next().unwrap_or_default().trim().split('/');
    let year = fragment(date.next(), DEFAULT_YEAR);
    let month = fragment(date.next(), DEFAULT_MONTH);
    let day = fragment(date.next(), DEFAULT_DAY);

    let (hour, minute) = date_time.next().map(parse_clock).unwrap_or((0, 0));

    make_time(year, month, day, hour, minute, 0)
}

/// weekday number with 0 = sunday .. 6 = saturday
pub fn weekday_number(dt: &NaiveDateTime) -> u32 {
    dt.weekday().num_days_from_sunday()
}

/// parse a day-of-week list as stored by the element editor ("1, 3, 5")
///
/// items are separated by comma-space; unparsable items are skipped
pub fn parse_day_list(s: &str) -> Vec<u32> {
    s.split(", ")
        .filter_map(|day| day.trim().parse::<u32>().ok())
        .collect()
}
