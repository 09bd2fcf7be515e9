//! A single trigger produced by evaluating a recurrence rule.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// Trigger time; midnight for all-day occurrences.
    pub timestamp: NaiveDateTime,
    pub all_day: bool,
    /// 0-based index within the enumeration that produced it.
    pub sequence: usize,
}

impl Occurrence {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl std::fmt::Display for Occurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.all_day {
            write!(f, "#{} {}", self.sequence, self.timestamp.format("%Y-%m-%d"))
        } else {
            write!(f, "#{} {}", self.sequence, self.timestamp.format("%Y-%m-%d %H:%M"))
        }
    }
}
