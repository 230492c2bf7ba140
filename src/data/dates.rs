//! Date Helpers
//! Permissive action-date parsing and civil-calendar arithmetic.

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, NaiveTime};

/// Format used for the reference and cutoff dates in the banner.
pub const BANNER_DATE_FORMAT: &str = "%d-%m-%Y";

/// Format used for datetime columns in exported CSV files.
pub const EXPORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Month-first variants come before day-first ones so "01/02/2023" reads as
// January 2nd, while "31/01/2023" still falls through to day-first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Parse a textual action date.
///
/// Accepts ISO dates and datetimes (with or without fractional seconds),
/// RFC 3339 timestamps (wall-clock time kept), slash/dash/dot separated
/// month-first and day-first dates, compact `YYYYMMDD` and English month
/// names. Returns `None` for anything else.
pub fn parse_action_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim().trim_matches('"').trim_matches('\'').trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    parse_compact_date(s)
}

/// `YYYYMMDD` without separators.
fn parse_compact_date(s: &str) -> Option<NaiveDateTime> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[4..6].parse().ok()?;
    let day: u32 = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(NaiveTime::MIN))
}

/// Truncate the time of day to midnight.
pub fn floor_to_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// Subtract whole calendar months, clamping the day to the target month.
pub fn months_before(dt: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    dt.checked_sub_months(Months::new(months))
}

/// Whole days elapsed from `earlier` to `later`, truncated toward zero.
pub fn whole_days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    (later - earlier).num_days()
}
