// Date utility functions
// Calendar arithmetic shared by the occurrence generator

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Adds `months` to a (year, month) pair, rolling the year as needed.
pub fn add_months(year: i32, month: u32, months: i64) -> (i32, u32) {
    let index = year as i64 * 12 + (month as i64 - 1) + months;
    (index.div_euclid(12) as i32, (index.rem_euclid(12) + 1) as u32)
}

/// Whole months from (`from_year`, `from_month`) to (`to_year`, `to_month`).
pub fn months_between(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> i64 {
    (to_year as i64 - from_year as i64) * 12 + to_month as i64 - from_month as i64
}

/// Resolves a day of month, counting back from the end when `day` is negative.
/// Returns `None` when the month has no such day.
pub fn day_of_month(year: i32, month: u32, day: i32) -> Option<NaiveDate> {
    let length = days_in_month(year, month) as i32;
    let resolved = if day < 0 { length + day + 1 } else { day };
    if resolved < 1 || resolved > length {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, resolved as u32)
}

/// The `n`th (1-based) `weekday` of the month, if the month has one.
pub fn nth_weekday_of_month(year: i32, month: u32, n: u32, weekday: Weekday) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, u8::try_from(n).ok()?)
}

pub fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
    let back = (last.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64
        + 7)
        % 7;
    Some(last - Duration::days(back))
}
