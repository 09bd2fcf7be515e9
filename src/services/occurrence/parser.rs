//! RRULE (RFC 5545) text form of recurrence rules.
//!
//! Only the parts a [`RecurrenceRule`] can express are understood; other
//! keys are ignored. The Feb 29 policy has no RRULE form and is supplied by
//! the caller.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::models::recurrence::{
    start_month, DaySet, Feb29Policy, MonthPosition, Pattern, RecurrenceRule,
    RecurrenceRuleBuilder, WeekPosition,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecurrenceFrequency {
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Parses an RRULE into a rule anchored at `start`.
pub fn parse_rrule(
    rrule: &str,
    start: NaiveDateTime,
    feb29_default: Feb29Policy,
) -> RecurrenceResult<RecurrenceRule> {
    parse_rrule_builder(rrule, start, feb29_default)?.build()
}

/// Parses an RRULE, leaving the builder open for exceptions or all-day flags.
pub fn parse_rrule_builder(
    rrule: &str,
    start: NaiveDateTime,
    feb29_default: Feb29Policy,
) -> RecurrenceResult<RecurrenceRuleBuilder> {
    let rrule = rrule.trim();
    let rrule = rrule.strip_prefix("RRULE:").unwrap_or(rrule);

    let frequency = detect_frequency(rrule)?;
    let interval = parse_interval(rrule, 1)?;
    let byday = field(rrule, "BYDAY");

    let (pattern, interval) = match frequency {
        RecurrenceFrequency::Minutely => (Pattern::SubDaily, interval),
        RecurrenceFrequency::Hourly => (
            Pattern::SubDaily,
            interval
                .checked_mul(60)
                .ok_or_else(|| parse_error(format!("INTERVAL {} hours is too large", interval)))?,
        ),
        RecurrenceFrequency::Daily => {
            let days = match byday {
                Some(value) => DaySet::new(parse_weekly_byday(value)?),
                None => DaySet::EMPTY,
            };
            (Pattern::Daily { days }, interval)
        }
        RecurrenceFrequency::Weekly => {
            let days = match byday {
                Some(value) => parse_weekly_byday(value)?,
                None => vec![start.weekday()],
            };
            (Pattern::weekly(days), interval)
        }
        RecurrenceFrequency::Monthly => {
            let position = parse_month_position(rrule, start)?;
            (Pattern::Monthly { position }, interval)
        }
        RecurrenceFrequency::Yearly => {
            let position = parse_month_position(rrule, start)?;
            let months = match parse_bymonth(rrule)? {
                months if months.is_empty() => start_month(start),
                months => months,
            };
            let pattern = Pattern::yearly(months, position);
            let pattern = if pattern.targets_feb29() {
                pattern.with_feb29(feb29_default)
            } else {
                pattern
            };
            (pattern, interval)
        }
    };

    let mut builder = RecurrenceRule::builder(pattern, start).interval(interval);
    if let Some(count) = parse_count(rrule)? {
        builder = builder.count(count);
    }
    if let Some(until) = parse_until(rrule)? {
        builder = builder.until(until);
    }

    Ok(builder)
}

impl RecurrenceRule {
    /// Formats the rule as an RRULE value (without the `RRULE:` prefix).
    pub fn to_rrule(&self) -> String {
        let mut parts = Vec::new();
        let mut interval = self.interval();

        match self.pattern() {
            Pattern::SubDaily => {
                if interval % 60 == 0 {
                    parts.push("FREQ=HOURLY".to_string());
                    interval /= 60;
                } else {
                    parts.push("FREQ=MINUTELY".to_string());
                }
            }
            Pattern::Daily { .. } => parts.push("FREQ=DAILY".to_string()),
            Pattern::Weekly { .. } => parts.push("FREQ=WEEKLY".to_string()),
            Pattern::Monthly { .. } => parts.push("FREQ=MONTHLY".to_string()),
            Pattern::Yearly { .. } => parts.push("FREQ=YEARLY".to_string()),
        }

        if interval != 1 {
            parts.push(format!("INTERVAL={}", interval));
        }

        match self.pattern() {
            Pattern::SubDaily => {}
            Pattern::Daily { days } | Pattern::Weekly { days } => {
                if !days.is_empty() {
                    let codes: Vec<_> = days.iter().map(weekday_code).collect();
                    parts.push(format!("BYDAY={}", codes.join(",")));
                }
            }
            Pattern::Monthly { position } => parts.push(format_month_position(*position)),
            Pattern::Yearly { months, position, .. } => {
                let months: Vec<_> = months.iter().map(u32::to_string).collect();
                parts.push(format!("BYMONTH={}", months.join(",")));
                parts.push(format_month_position(*position));
            }
        }

        if let Some(count) = self.count() {
            parts.push(format!("COUNT={}", count));
        }
        if let Some(end) = self.end() {
            if self.is_all_day() {
                parts.push(format!("UNTIL={}", end.format("%Y%m%d")));
            } else {
                parts.push(format!("UNTIL={}", end.format("%Y%m%dT%H%M%S")));
            }
        }

        parts.join(";")
    }
}

fn format_month_position(position: MonthPosition) -> String {
    match position {
        MonthPosition::ByDate(day) => format!("BYMONTHDAY={}", day),
        MonthPosition::ByPosition(week, weekday) => {
            format!("BYDAY={}{}", week.index(), weekday_code(weekday))
        }
    }
}

fn parse_error(message: impl Into<String>) -> RecurrenceError {
    RecurrenceError::Parse(message.into())
}

/// Value of `KEY=` within a `;`-separated rule.
fn field<'a>(rrule: &'a str, key: &str) -> Option<&'a str> {
    rrule.split(';').find_map(|part| {
        let (name, value) = part.split_once('=')?;
        name.trim().eq_ignore_ascii_case(key).then(|| value.trim())
    })
}

fn detect_frequency(rrule: &str) -> RecurrenceResult<RecurrenceFrequency> {
    match field(rrule, "FREQ").map(str::to_ascii_uppercase).as_deref() {
        Some("MINUTELY") => Ok(RecurrenceFrequency::Minutely),
        Some("HOURLY") => Ok(RecurrenceFrequency::Hourly),
        Some("DAILY") => Ok(RecurrenceFrequency::Daily),
        Some("WEEKLY") => Ok(RecurrenceFrequency::Weekly),
        Some("MONTHLY") => Ok(RecurrenceFrequency::Monthly),
        Some("YEARLY") => Ok(RecurrenceFrequency::Yearly),
        Some(other) => Err(parse_error(format!("unsupported FREQ '{}'", other))),
        None => Err(parse_error("missing FREQ")),
    }
}

fn parse_count(rrule: &str) -> RecurrenceResult<Option<u32>> {
    field(rrule, "COUNT")
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|_| parse_error(format!("invalid COUNT '{}'", value)))
        })
        .transpose()
}

fn parse_until(rrule: &str) -> RecurrenceResult<Option<NaiveDateTime>> {
    let Some(value) = field(rrule, "UNTIL") else {
        return Ok(None);
    };
    let text = value.trim_end_matches('Z');

    if text.len() == 8 {
        let date = NaiveDate::parse_from_str(text, "%Y%m%d")
            .map_err(|_| parse_error(format!("invalid UNTIL '{}'", value)))?;
        // A bare date includes the whole day
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        return Ok(Some(date.and_time(end_of_day)));
    }

    NaiveDateTime::parse_from_str(text, "%Y%m%dT%H%M%S")
        .map(Some)
        .map_err(|_| parse_error(format!("invalid UNTIL '{}'", value)))
}

fn parse_interval(rrule: &str, default: u32) -> RecurrenceResult<u32> {
    match field(rrule, "INTERVAL") {
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| parse_error(format!("invalid INTERVAL '{}'", value))),
        None => Ok(default),
    }
}

fn parse_weekly_byday(value: &str) -> RecurrenceResult<Vec<Weekday>> {
    value
        .split(',')
        .map(|code| {
            weekday_from_code(code.trim())
                .ok_or_else(|| parse_error(format!("invalid BYDAY entry '{}'", code)))
        })
        .collect()
}

fn parse_bymonthday(rrule: &str) -> RecurrenceResult<Option<i32>> {
    field(rrule, "BYMONTHDAY")
        .map(|value| {
            value
                .parse::<i32>()
                .map_err(|_| parse_error(format!("invalid BYMONTHDAY '{}'", value)))
        })
        .transpose()
}

fn parse_positional_byday(rrule: &str) -> RecurrenceResult<Option<(WeekPosition, Weekday)>> {
    let Some(day_str) = field(rrule, "BYDAY") else {
        return Ok(None);
    };

    if day_str.len() <= 2 || !day_str.is_char_boundary(day_str.len() - 2) {
        return Err(parse_error(format!("BYDAY '{}' needs a week position", day_str)));
    }

    let (position, weekday_code) = day_str.split_at(day_str.len() - 2);
    let weekday = weekday_from_code(weekday_code)
        .ok_or_else(|| parse_error(format!("invalid BYDAY weekday '{}'", weekday_code)))?;
    let index = position
        .trim_start_matches('+')
        .parse::<i32>()
        .map_err(|_| parse_error(format!("invalid BYDAY position '{}'", position)))?;

    Ok(Some((WeekPosition::from_index(index)?, weekday)))
}

fn parse_bymonth(rrule: &str) -> RecurrenceResult<BTreeSet<u32>> {
    let Some(value) = field(rrule, "BYMONTH") else {
        return Ok(BTreeSet::new());
    };

    value
        .split(',')
        .map(|month| {
            month
                .trim()
                .parse::<u32>()
                .map_err(|_| parse_error(format!("invalid BYMONTH entry '{}'", month)))
        })
        .collect()
}

fn parse_month_position(rrule: &str, start: NaiveDateTime) -> RecurrenceResult<MonthPosition> {
    if let Some(day) = parse_bymonthday(rrule)? {
        if field(rrule, "BYDAY").is_some() {
            return Err(parse_error("BYMONTHDAY cannot be combined with BYDAY"));
        }
        return Ok(MonthPosition::ByDate(day));
    }
    if let Some((week, weekday)) = parse_positional_byday(rrule)? {
        return Ok(MonthPosition::ByPosition(week, weekday));
    }
    Ok(MonthPosition::ByDate(start.day() as i32))
}

fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "SU" => Some(Weekday::Sun),
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        _ => None,
    }
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SU",
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidRule;
    use crate::models::recurrence::FrequencyUnit;
    use test_case::test_case;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_weekly_byday_list() {
        let rule = parse_rrule("RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR", start(), Feb29Policy::Mar1)
            .unwrap();

        assert_eq!(rule.interval(), 2);
        assert_eq!(
            rule.pattern(),
            &Pattern::Weekly {
                days: DaySet::new([Weekday::Mon, Weekday::Fri])
            }
        );
    }

    #[test]
    fn test_weekly_defaults_to_start_weekday() {
        let rule = parse_rrule("FREQ=WEEKLY", start(), Feb29Policy::Mar1).unwrap();
        assert_eq!(rule.pattern(), &Pattern::weekly([Weekday::Thu]));
    }

    #[test]
    fn test_hourly_becomes_minutes() {
        let rule = parse_rrule("FREQ=HOURLY;INTERVAL=3", start(), Feb29Policy::Mar1).unwrap();
        assert_eq!(rule.unit(), FrequencyUnit::SubDaily);
        assert_eq!(rule.interval(), 180);
    }

    #[test]
    fn test_monthly_positional() {
        let rule = parse_rrule("FREQ=MONTHLY;BYDAY=-1FR", start(), Feb29Policy::Mar1).unwrap();
        assert_eq!(
            rule.pattern(),
            &Pattern::monthly_on_weekday(WeekPosition::Last, Weekday::Fri)
        );
    }

    #[test]
    fn test_yearly_feb29_takes_default_policy() {
        let rule = parse_rrule("FREQ=YEARLY", start(), Feb29Policy::Feb28).unwrap();
        match rule.pattern() {
            Pattern::Yearly { months, position, feb29 } => {
                assert_eq!(months, &BTreeSet::from([2]));
                assert_eq!(*position, MonthPosition::ByDate(29));
                assert_eq!(*feb29, Some(Feb29Policy::Feb28));
            }
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn test_count_and_until() {
        let rule = parse_rrule("FREQ=DAILY;COUNT=5;UNTIL=20240310", start(), Feb29Policy::Mar1)
            .unwrap();
        assert_eq!(rule.count(), Some(5));
        assert_eq!(
            rule.end(),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(23, 59, 59)
        );
    }

    #[test_case("INTERVAL=2"; "missing freq")]
    #[test_case("FREQ=SECONDLY"; "unsupported freq")]
    #[test_case("FREQ=DAILY;INTERVAL=x"; "bad interval")]
    #[test_case("FREQ=WEEKLY;BYDAY=XX"; "bad weekday")]
    #[test_case("FREQ=MONTHLY;BYDAY=MO"; "missing position")]
    #[test_case("FREQ=DAILY;UNTIL=2024-03-10"; "bad until")]
    #[test_case("FREQ=MONTHLY;BYMONTHDAY=10;BYDAY=2TU"; "monthday with weekday")]
    #[test_case("FREQ=YEARLY;BYMONTH=3;BYMONTHDAY=1;BYDAY=-1SU"; "yearly monthday with weekday")]
    fn test_parse_errors(rrule: &str) {
        assert!(matches!(
            parse_rrule(rrule, start(), Feb29Policy::Mar1),
            Err(RecurrenceError::Parse(_))
        ));
    }

    #[test]
    fn test_fifth_week_rejected_as_invalid_rule() {
        assert_eq!(
            parse_rrule("FREQ=MONTHLY;BYDAY=5MO", start(), Feb29Policy::Mar1).unwrap_err(),
            RecurrenceError::InvalidRule(InvalidRule::InvalidWeekPosition(5))
        );
    }

    #[test_case("FREQ=MINUTELY;INTERVAL=90")]
    #[test_case("FREQ=HOURLY;INTERVAL=2")]
    #[test_case("FREQ=DAILY;BYDAY=TU,SA;COUNT=4")]
    #[test_case("FREQ=WEEKLY;INTERVAL=3;BYDAY=MO,WE")]
    #[test_case("FREQ=MONTHLY;BYMONTHDAY=-1")]
    #[test_case("FREQ=MONTHLY;BYDAY=2TU;UNTIL=20251231T090000")]
    #[test_case("FREQ=YEARLY;BYMONTH=2,8;BYMONTHDAY=14")]
    fn test_format_matches_parsed_text(rrule: &str) {
        let rule = parse_rrule(rrule, start(), Feb29Policy::Mar1).unwrap();
        assert_eq!(rule.to_rrule(), rrule);
    }
}
