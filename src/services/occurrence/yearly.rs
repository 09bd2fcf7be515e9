use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime};

use super::utils::select_year_position;
use crate::models::recurrence::{Feb29Policy, MonthPosition, RecurrenceRule};

pub(super) fn candidates(
    rule: &RecurrenceRule,
    months: &BTreeSet<u32>,
    position: MonthPosition,
    feb29: Option<Feb29Policy>,
    period: i64,
) -> Vec<NaiveDateTime> {
    let start = rule.start();
    let years = period.saturating_mul(rule.interval() as i64);
    let Some(year) = i32::try_from(start.year() as i64 + years).ok() else {
        return Vec::new();
    };

    months
        .iter()
        .filter_map(|&month| select_year_position(year, month, position, feb29))
        .map(|date| date.and_time(start.time()))
        .collect()
}

pub(super) fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    (at.year() as i64 - rule.start().year() as i64) / rule.interval() as i64
}
