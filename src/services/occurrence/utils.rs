use chrono::NaiveDate;

use crate::models::recurrence::{Feb29Policy, MonthPosition, WeekPosition};
use crate::utils::date::{day_of_month, is_leap_year, last_weekday_of_month, nth_weekday_of_month};

/// Resolves a month position to a date. Days the month lacks are skipped, never clamped.
pub(super) fn select_month_position(year: i32, month: u32, position: MonthPosition) -> Option<NaiveDate> {
    match position {
        MonthPosition::ByDate(day) => day_of_month(year, month, day),
        MonthPosition::ByPosition(WeekPosition::Last, weekday) => {
            last_weekday_of_month(year, month, weekday)
        }
        MonthPosition::ByPosition(week, weekday) => {
            nth_weekday_of_month(year, month, week.index() as u32, weekday)
        }
    }
}

/// Like [`select_month_position`], applying the Feb 29 policy in non-leap years.
pub(super) fn select_year_position(
    year: i32,
    month: u32,
    position: MonthPosition,
    feb29: Option<Feb29Policy>,
) -> Option<NaiveDate> {
    if month == 2 && position == MonthPosition::ByDate(29) && !is_leap_year(year) {
        return match feb29 {
            Some(Feb29Policy::Mar1) => NaiveDate::from_ymd_opt(year, 3, 1),
            Some(Feb29Policy::Feb28) => NaiveDate::from_ymd_opt(year, 2, 28),
            Some(Feb29Policy::Skip) | None => None,
        };
    }

    select_month_position(year, month, position)
}
