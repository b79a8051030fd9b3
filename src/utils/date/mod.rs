// Date utility functions
// Local-time helpers used by the time grid and drag sessions

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone, Timelike};

/// Resolve a wall-clock time in the local zone.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward by an hour, which is where the wall clock lands.
pub fn to_local(naive: NaiveDateTime) -> DateTime<Local> {
    naive
        .and_local_timezone(Local)
        .earliest()
        .or_else(|| (naive + Duration::hours(1)).and_local_timezone(Local).earliest())
        .unwrap_or_else(|| Local.from_utc_datetime(&naive))
}

/// Wall-clock minutes since midnight, with seconds as a fraction.
pub fn minute_of_day(date: DateTime<Local>) -> f64 {
    let time = date.time();
    f64::from(time.hour() * 60 + time.minute()) + f64::from(time.second()) / 60.0
}

/// Same wall-clock time, `days` calendar days later (or earlier).
pub fn shift_days(date: DateTime<Local>, days: i64) -> DateTime<Local> {
    if days == 0 {
        return date;
    }
    to_local(date.naive_local() + Duration::days(days))
}
