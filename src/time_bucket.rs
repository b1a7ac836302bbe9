//! Calendar-day bucketing of timestamps
//!
//! Streaks count calendar days, and a "day" depends on where the learner is.
//! Days are computed in a fixed UTC offset taken from configuration.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Build the offset for `minutes` east of UTC, falling back to UTC when out of range
pub fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Calendar day of `at` in the given offset
///
/// # Example
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use mlquest::time_bucket::{day_of, offset_from_minutes};
///
/// let at = Utc.with_ymd_and_hms(2023, 12, 28, 23, 30, 0).unwrap();
/// assert_eq!(day_of(at, offset_from_minutes(0)), NaiveDate::from_ymd_opt(2023, 12, 28).unwrap());
/// assert_eq!(day_of(at, offset_from_minutes(60)), NaiveDate::from_ymd_opt(2023, 12, 29).unwrap());
/// ```
pub fn day_of(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}
