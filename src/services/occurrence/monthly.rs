use chrono::{Datelike, NaiveDateTime};

use super::utils::select_month_position;
use crate::models::recurrence::{MonthPosition, RecurrenceRule};
use crate::utils::date::{add_months, months_between};

pub(super) fn candidates(
    rule: &RecurrenceRule,
    position: MonthPosition,
    period: i64,
) -> Vec<NaiveDateTime> {
    let start = rule.start();
    let months = period.saturating_mul(rule.interval() as i64);
    let (year, month) = add_months(start.year(), start.month(), months);

    select_month_position(year, month, position)
        .map(|date| date.and_time(start.time()))
        .into_iter()
        .collect()
}

pub(super) fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    let start = rule.start();
    months_between(start.year(), start.month(), at.year(), at.month()) / rule.interval() as i64
}
