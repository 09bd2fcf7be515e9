//! Error types shared by the recurrence and attribute layers.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Reasons a recurrence rule is rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRule {
    #[error("interval must be at least 1")]
    ZeroInterval,

    #[error("weekly recurrence needs at least one weekday")]
    NoWeekdays,

    #[error("yearly recurrence needs at least one month")]
    NoMonths,

    #[error("yearly recurrence on 29 February needs a Feb 29 policy")]
    MissingFeb29Policy,

    #[error("recurrence end {end} is before its start {start}")]
    InvertedRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("occurrence count must be at least 1")]
    ZeroCount,

    #[error("day of month {0} is out of range (1..=31 or -31..=-1)")]
    InvalidDayOfMonth(i32),

    #[error("week position {0} is out of range (1..=4 or -1 for last)")]
    InvalidWeekPosition(i32),

    #[error("month {0} is out of range (1..=12)")]
    InvalidMonth(u32),

    #[error("minute-based recurrence cannot be all-day")]
    AllDaySubDaily,
}

/// Errors raised while building, checking or parsing recurrences.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(#[from] InvalidRule),

    #[error("RRULE parse error: {0}")]
    Parse(String),
}

/// Failures of the whitespace-delimited attribute wire formats.
///
/// `field` is the 0-based position of the offending token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("field {field}: '{value}' is not an integer")]
    Unparseable { field: usize, value: String },

    #[error("field {field}: bitmask {bits:#x} contains unknown bits")]
    UnknownBits { field: usize, bits: i64 },

    #[error("field {field}: value {value} is out of range")]
    Range { field: usize, value: i64 },
}

pub type RecurrenceResult<T> = Result<T, RecurrenceError>;
