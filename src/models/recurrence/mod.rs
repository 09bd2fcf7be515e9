// Recurrence module
// Immutable alarm recurrence rules, validated on construction

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidRule, RecurrenceError};

/// The unit a rule's interval is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyUnit {
    SubDaily,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Set of weekdays, iterated Monday to Sunday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaySet(u8);

impl DaySet {
    pub const EMPTY: DaySet = DaySet(0);

    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::EMPTY, |set, day| set.with(day))
    }

    pub fn with(self, day: Weekday) -> Self {
        DaySet(self.0 | 1 << day.num_days_from_monday())
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 & 0x7f == 0
    }

    pub fn len(&self) -> usize {
        (self.0 & 0x7f).count_ones() as usize
    }

    /// Selected days in ISO order (Monday first).
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        (0..7u8)
            .map(weekday_from_monday)
            .filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        DaySet::new(iter)
    }
}

fn weekday_from_monday(offset: u8) -> Weekday {
    match offset {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}

/// Which week of the month a positional rule picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekPosition {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekPosition {
    /// Maps 1..=4 and -1 (last) to a position.
    pub fn from_index(index: i32) -> Result<Self, InvalidRule> {
        match index {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            4 => Ok(Self::Fourth),
            -1 => Ok(Self::Last),
            other => Err(InvalidRule::InvalidWeekPosition(other)),
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }
}

/// Day selection within a month, for monthly and yearly rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonthPosition {
    /// Day of the month; negative values count back from the last day.
    ByDate(i32),
    ByPosition(WeekPosition, Weekday),
}

impl MonthPosition {
    fn validate(&self) -> Result<(), InvalidRule> {
        match *self {
            MonthPosition::ByDate(day) if day == 0 || !(-31..=31).contains(&day) => {
                Err(InvalidRule::InvalidDayOfMonth(day))
            }
            _ => Ok(()),
        }
    }
}

/// How a 29 February yearly rule behaves in non-leap years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feb29Policy {
    /// No occurrence in non-leap years.
    #[serde(alias = "none")]
    Skip,
    #[default]
    Mar1,
    Feb28,
}

/// The repeating pattern, one variant per frequency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// Repeats every `interval` minutes.
    SubDaily,
    /// Repeats every `interval` days, restricted to `days` when non-empty.
    Daily { days: DaySet },
    Weekly { days: DaySet },
    Monthly { position: MonthPosition },
    Yearly {
        months: BTreeSet<u32>,
        position: MonthPosition,
        feb29: Option<Feb29Policy>,
    },
}

impl Pattern {
    pub fn sub_daily() -> Self {
        Pattern::SubDaily
    }

    pub fn daily() -> Self {
        Pattern::Daily { days: DaySet::EMPTY }
    }

    pub fn daily_on(days: impl IntoIterator<Item = Weekday>) -> Self {
        Pattern::Daily { days: DaySet::new(days) }
    }

    pub fn weekly(days: impl IntoIterator<Item = Weekday>) -> Self {
        Pattern::Weekly { days: DaySet::new(days) }
    }

    pub fn monthly_on_day(day: i32) -> Self {
        Pattern::Monthly { position: MonthPosition::ByDate(day) }
    }

    pub fn monthly_on_weekday(week: WeekPosition, weekday: Weekday) -> Self {
        Pattern::Monthly { position: MonthPosition::ByPosition(week, weekday) }
    }

    pub fn yearly(months: impl IntoIterator<Item = u32>, position: MonthPosition) -> Self {
        Pattern::Yearly {
            months: months.into_iter().collect(),
            position,
            feb29: None,
        }
    }

    /// Sets the Feb 29 policy of a yearly pattern; other patterns are returned unchanged.
    pub fn with_feb29(self, policy: Feb29Policy) -> Self {
        match self {
            Pattern::Yearly { months, position, .. } => Pattern::Yearly {
                months,
                position,
                feb29: Some(policy),
            },
            other => other,
        }
    }

    pub fn unit(&self) -> FrequencyUnit {
        match self {
            Pattern::SubDaily => FrequencyUnit::SubDaily,
            Pattern::Daily { .. } => FrequencyUnit::Daily,
            Pattern::Weekly { .. } => FrequencyUnit::Weekly,
            Pattern::Monthly { .. } => FrequencyUnit::Monthly,
            Pattern::Yearly { .. } => FrequencyUnit::Yearly,
        }
    }

    /// True for a yearly pattern that lands on 29 February.
    pub fn targets_feb29(&self) -> bool {
        matches!(
            self,
            Pattern::Yearly { months, position: MonthPosition::ByDate(29), .. } if months.contains(&2)
        )
    }
}

/// A validated, immutable recurrence rule.
///
/// `start` anchors the interval phase and is the earliest valid occurrence;
/// its time of day is used for every occurrence. Edits go through
/// [`RecurrenceRule::builder`] again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pattern: Pattern,
    interval: u32,
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    count: Option<u32>,
    all_day: bool,
    exception_dates: BTreeSet<NaiveDate>,
    exception_date_times: BTreeSet<NaiveDateTime>,
}

impl RecurrenceRule {
    /// Start building a rule from its pattern and anchor time.
    ///
    /// # Examples
    /// ```
    /// use kalarm_core::models::recurrence::{Pattern, RecurrenceRule};
    /// use chrono::{NaiveDate, Weekday};
    ///
    /// let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(9, 0, 0).unwrap();
    /// let rule = RecurrenceRule::builder(Pattern::weekly([Weekday::Mon]), start)
    ///     .interval(2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(rule.interval(), 2);
    /// ```
    pub fn builder(pattern: Pattern, start: NaiveDateTime) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(pattern, start)
    }

    /// Re-checks every construction invariant.
    ///
    /// Rules built through the builder always pass; deserialized rules may not.
    pub fn validate(&self) -> Result<(), InvalidRule> {
        if self.interval < 1 {
            return Err(InvalidRule::ZeroInterval);
        }

        if self.count == Some(0) {
            return Err(InvalidRule::ZeroCount);
        }

        if let Some(end) = self.end {
            if end < self.start {
                return Err(InvalidRule::InvertedRange {
                    start: self.start,
                    end,
                });
            }
        }

        match &self.pattern {
            Pattern::SubDaily => {
                if self.all_day {
                    return Err(InvalidRule::AllDaySubDaily);
                }
            }
            Pattern::Daily { .. } => {}
            Pattern::Weekly { days } => {
                if days.is_empty() {
                    return Err(InvalidRule::NoWeekdays);
                }
            }
            Pattern::Monthly { position } => position.validate()?,
            Pattern::Yearly { months, position, feb29 } => {
                if months.is_empty() {
                    return Err(InvalidRule::NoMonths);
                }
                if let Some(&month) = months.iter().find(|m| !(1..=12).contains(*m)) {
                    return Err(InvalidRule::InvalidMonth(month));
                }
                position.validate()?;
                if feb29.is_none() && self.pattern.targets_feb29() {
                    return Err(InvalidRule::MissingFeb29Policy);
                }
            }
        }

        Ok(())
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn unit(&self) -> FrequencyUnit {
        self.pattern.unit()
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    pub fn exception_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.exception_dates
    }

    pub fn exception_date_times(&self) -> &BTreeSet<NaiveDateTime> {
        &self.exception_date_times
    }

    /// Whether a generated candidate is excluded by an exception.
    pub fn is_excluded(&self, candidate: NaiveDateTime) -> bool {
        self.exception_dates.contains(&candidate.date())
            || self.exception_date_times.contains(&candidate)
    }

    /// Whether a candidate lies beyond the inclusive range end.
    pub fn is_past_end(&self, candidate: NaiveDateTime) -> bool {
        match self.end {
            Some(end) if self.all_day => candidate.date() > end.date(),
            Some(end) => candidate > end,
            None => false,
        }
    }

    /// True when the sequence is finite without a caller-side limit.
    pub fn is_bounded(&self) -> bool {
        self.end.is_some() || self.count.is_some()
    }
}

/// Builder for creating recurrence rules with optional fields
pub struct RecurrenceRuleBuilder {
    pattern: Pattern,
    start: NaiveDateTime,
    interval: u32,
    end: Option<NaiveDateTime>,
    count: Option<u32>,
    all_day: bool,
    exception_dates: BTreeSet<NaiveDate>,
    exception_date_times: BTreeSet<NaiveDateTime>,
}

impl RecurrenceRuleBuilder {
    pub fn new(pattern: Pattern, start: NaiveDateTime) -> Self {
        Self {
            pattern,
            start,
            interval: 1,
            end: None,
            count: None,
            all_day: false,
            exception_dates: BTreeSet::new(),
            exception_date_times: BTreeSet::new(),
        }
    }

    /// Repeat every `interval` units (minutes for sub-daily rules)
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Set the inclusive range end
    pub fn until(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Limit the total number of occurrences counted from the start
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Generate date-only occurrences
    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn exception_date(mut self, date: NaiveDate) -> Self {
        self.exception_dates.insert(date);
        self
    }

    pub fn exception_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.exception_dates.extend(dates);
        self
    }

    pub fn exception_date_time(mut self, date_time: NaiveDateTime) -> Self {
        self.exception_date_times.insert(date_time);
        self
    }

    /// Build the rule, rejecting anything that breaks its invariants
    pub fn build(self) -> Result<RecurrenceRule, RecurrenceError> {
        let start = if self.all_day {
            self.start.date().and_time(NaiveTime::MIN)
        } else {
            self.start
        };

        let rule = RecurrenceRule {
            pattern: self.pattern,
            interval: self.interval,
            start,
            end: self.end,
            count: self.count,
            all_day: self.all_day,
            exception_dates: self.exception_dates,
            exception_date_times: self.exception_date_times,
        };

        rule.validate()?;
        Ok(rule)
    }
}

/// Default month set for a yearly rule: the month of its start.
pub fn start_month(start: NaiveDateTime) -> BTreeSet<u32> {
    BTreeSet::from([start.month()])
}
