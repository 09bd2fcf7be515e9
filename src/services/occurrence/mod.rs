//! Occurrence generation for alarm recurrence rules.
//!
//! Each frequency unit lives in its own submodule and turns a period index
//! (0 = the period containing the rule start) into that period's candidate
//! trigger times. [`Occurrences`] pulls periods one at a time and applies the
//! rule's start, count, range end and exceptions before yielding.

use std::collections::VecDeque;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::RecurrenceResult;
use crate::models::occurrence::Occurrence;
use crate::models::recurrence::{Pattern, RecurrenceRule};

mod daily;
mod monthly;
pub mod parser;
mod sub_daily;
mod utils;
mod weekly;
mod yearly;

pub use parser::{parse_rrule, parse_rrule_builder};

/// Consecutive candidate-free periods after which a rule is treated as exhausted.
pub const MAX_EMPTY_PERIODS: u32 = 1000;

/// Lazily enumerate occurrences at or after `from`.
///
/// The sequence is strictly increasing and finite when the rule has an end
/// or count, or when `limit` is given. Otherwise the caller bounds consumption.
pub fn occurrences_from(
    rule: &RecurrenceRule,
    from: NaiveDateTime,
    limit: Option<usize>,
) -> RecurrenceResult<Occurrences<'_>> {
    rule.validate()?;
    Ok(Occurrences::new(rule, from, limit))
}

/// First occurrence strictly after `after` (for all-day rules, on a later date).
pub fn next_after(
    rule: &RecurrenceRule,
    after: NaiveDateTime,
) -> RecurrenceResult<Option<Occurrence>> {
    let all_day = rule.is_all_day();
    Ok(occurrences_from(rule, after, None)?.find(|occurrence| {
        if all_day {
            occurrence.date() > after.date()
        } else {
            occurrence.timestamp > after
        }
    }))
}

/// All occurrences within the inclusive window `from..=to`.
pub fn occurrences_between(
    rule: &RecurrenceRule,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> RecurrenceResult<Vec<Occurrence>> {
    let all_day = rule.is_all_day();
    Ok(occurrences_from(rule, from, None)?
        .take_while(|occurrence| {
            if all_day {
                occurrence.date() <= to.date()
            } else {
                occurrence.timestamp <= to
            }
        })
        .collect())
}

/// Pull-based occurrence sequence; see [`occurrences_from`].
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    from: NaiveDateTime,
    limit: Option<usize>,
    period: i64,
    pending: VecDeque<NaiveDateTime>,
    counted: u32,
    yielded: usize,
    empty_run: u32,
    finished: bool,
}

impl<'a> Occurrences<'a> {
    fn new(rule: &'a RecurrenceRule, from: NaiveDateTime, limit: Option<usize>) -> Self {
        let from = if rule.is_all_day() {
            from.date().and_time(NaiveTime::MIN)
        } else {
            from
        };

        // COUNT is measured from the rule start, so counted rules cannot skip ahead
        let period = if rule.count().is_none() && from > rule.start() {
            period_containing(rule, from)
        } else {
            0
        };

        Self {
            rule,
            from,
            limit,
            period,
            pending: VecDeque::new(),
            counted: 0,
            yielded: 0,
            empty_run: 0,
            finished: limit == Some(0) || rule.is_past_end(from),
        }
    }

    /// Ensures `pending` holds candidates. False once the rule is exhausted.
    fn refill(&mut self) -> bool {
        while self.pending.is_empty() {
            if self.empty_run >= MAX_EMPTY_PERIODS {
                log::debug!(
                    "No candidates in {} consecutive periods from period {} ({}), stopping",
                    self.empty_run,
                    self.period,
                    self.rule.to_rrule()
                );
                return false;
            }

            let candidates = candidates(self.rule, self.period);
            self.period += 1;

            if candidates.is_empty() {
                self.empty_run += 1;
            } else {
                self.empty_run = 0;
                self.pending.extend(candidates);
            }
        }
        true
    }
}

impl Iterator for Occurrences<'_> {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        if self.finished {
            return None;
        }

        if self.limit.is_some_and(|limit| self.yielded >= limit) {
            self.finished = true;
            return None;
        }

        loop {
            if !self.refill() {
                self.finished = true;
                return None;
            }
            let Some(candidate) = self.pending.pop_front() else {
                continue;
            };

            if candidate < self.rule.start() {
                continue;
            }

            if let Some(count) = self.rule.count() {
                if self.counted >= count {
                    self.finished = true;
                    return None;
                }
                self.counted += 1;
            }

            if self.rule.is_past_end(candidate) {
                self.finished = true;
                return None;
            }

            if candidate < self.from || self.rule.is_excluded(candidate) {
                continue;
            }

            let occurrence = Occurrence {
                timestamp: candidate,
                all_day: self.rule.is_all_day(),
                sequence: self.yielded,
            };
            self.yielded += 1;
            return Some(occurrence);
        }
    }
}

fn candidates(rule: &RecurrenceRule, period: i64) -> Vec<NaiveDateTime> {
    match rule.pattern() {
        Pattern::SubDaily => sub_daily::candidates(rule, period),
        Pattern::Daily { days } => daily::candidates(rule, *days, period),
        Pattern::Weekly { days } => weekly::candidates(rule, *days, period),
        Pattern::Monthly { position } => monthly::candidates(rule, *position, period),
        Pattern::Yearly { months, position, feb29 } => {
            yearly::candidates(rule, months, *position, *feb29, period)
        }
    }
}

fn period_containing(rule: &RecurrenceRule, at: NaiveDateTime) -> i64 {
    match rule.pattern() {
        Pattern::SubDaily => sub_daily::period_containing(rule, at),
        Pattern::Daily { .. } => daily::period_containing(rule, at),
        Pattern::Weekly { .. } => weekly::period_containing(rule, at),
        Pattern::Monthly { .. } => monthly::period_containing(rule, at),
        Pattern::Yearly { .. } => yearly::period_containing(rule, at),
    }
}
