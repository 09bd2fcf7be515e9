use chrono::{Datelike, Duration, NaiveDateTime};

use crate::models::recurrence::{DaySet, RecurrenceRule};

pub(super) fn candidates(rule: &RecurrenceRule, days: DaySet, period: i64) -> Vec<NaiveDateTime> {
    let offset = period.saturating_mul(rule.interval() as i64);
    let Some(date) = Duration::try_days(offset).and_then(|d| rule.start().date().checked_add_signed(d))
    else {
        return Vec::new();
    };

    // An empty day set means every day
    if !days.is_empty() && !days.contains(date.weekday()) {
        return Vec::new();
    }

    vec![date.and_time(rule.start().time())]
}

pub(super) fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    (at.date() - rule.start().date()).num_days() / rule.interval() as i64
}
