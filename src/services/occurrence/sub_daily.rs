use chrono::{Duration, NaiveDateTime};

use crate::models::recurrence::RecurrenceRule;

pub(super) fn candidates(rule: &RecurrenceRule, period: i64) -> Vec<NaiveDateTime> {
    let minutes = period.saturating_mul(rule.interval() as i64);
    Duration::try_minutes(minutes)
        .and_then(|offset| rule.start().checked_add_signed(offset))
        .into_iter()
        .collect()
}

pub(super) fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    (at - rule.start()).num_minutes() / rule.interval() as i64
}
