use chrono::{Duration, NaiveDateTime};

use crate::models::recurrence::{DaySet, RecurrenceRule};
use crate::utils::date::start_of_week;

/// Candidates within one block of `interval` weeks, Monday to Sunday.
pub(super) fn candidates(rule: &RecurrenceRule, days: DaySet, period: i64) -> Vec<NaiveDateTime> {
    let weeks = period.saturating_mul(rule.interval() as i64);
    let Some(week_start) = Duration::try_weeks(weeks)
        .and_then(|d| start_of_week(rule.start().date()).checked_add_signed(d))
    else {
        return Vec::new();
    };

    let time = rule.start().time();
    days.iter()
        .filter_map(|day| {
            week_start.checked_add_signed(Duration::days(day.num_days_from_monday() as i64))
        })
        .map(|date| date.and_time(time))
        .collect()
}

pub(super) fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    let weeks = (start_of_week(at.date()) - start_of_week(rule.start().date())).num_weeks();
    weeks / rule.interval() as i64
}
