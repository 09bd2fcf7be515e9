// Property-based tests for recurrence evaluation and attribute encoding

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use kalarm_core::models::collection::{AlarmType, AlarmTypes, CollectionPolicy, Rgba};
use kalarm_core::models::event::EventKind;
use kalarm_core::models::recurrence::{
    Feb29Policy, MonthPosition, Pattern, RecurrenceRule, WeekPosition,
};
use kalarm_core::services::occurrence::occurrences_from;
use kalarm_core::services::status::rewrite_uid;

fn datetime(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday(index: u8) -> Weekday {
    WEEKDAYS[index as usize % 7]
}

/// Enumerating from `from` must match stepping from the rule start and
/// discarding everything earlier.
fn check_fast_forward(rule: &RecurrenceRule, from: NaiveDateTime) -> Result<(), TestCaseError> {
    let floor = if rule.is_all_day() {
        from.date().and_time(NaiveTime::MIN)
    } else {
        from
    };

    let skipped: Vec<_> = occurrences_from(rule, from, Some(5))
        .unwrap()
        .map(|o| (o.timestamp, o.all_day))
        .collect();
    let stepped: Vec<_> = occurrences_from(rule, rule.start(), None)
        .unwrap()
        .filter(|o| o.timestamp >= floor)
        .take(5)
        .map(|o| (o.timestamp, o.all_day))
        .collect();

    prop_assert_eq!(skipped, stepped);
    Ok(())
}

fn feb29_policy() -> impl Strategy<Value = Feb29Policy> {
    prop_oneof![
        Just(Feb29Policy::Skip),
        Just(Feb29Policy::Mar1),
        Just(Feb29Policy::Feb28),
    ]
}

fn week_position() -> impl Strategy<Value = WeekPosition> {
    prop_oneof![Just(1), Just(2), Just(3), Just(4), Just(-1)]
        .prop_map(|index| WeekPosition::from_index(index).unwrap())
}

proptest! {
    /// Single-day weekly rules always step by exactly `interval` weeks
    #[test]
    fn prop_weekly_spacing(
        year in 2020..2030i32,
        month in 1..=12u32,
        day in 1..=28u32,
        interval in 1..=4u32,
    ) {
        let start = datetime(year, month, day, 8);
        let rule = RecurrenceRule::builder(Pattern::weekly([start.weekday()]), start)
            .interval(interval)
            .build()
            .unwrap();

        let times: Vec<_> = occurrences_from(&rule, start, Some(10))
            .unwrap()
            .map(|o| o.timestamp)
            .collect();

        prop_assert_eq!(times.len(), 10);
        prop_assert_eq!(times[0], start);
        for pair in times.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::weeks(interval as i64));
        }
    }

    /// Occurrences are strictly increasing and never precede the reference time
    #[test]
    fn prop_monthly_strictly_increasing(
        day in -31..=31i32,
        interval in 1..=12u32,
        offset_days in 0..2000i64,
    ) {
        prop_assume!(day != 0);
        let start = datetime(2024, 1, 1, 9);
        let rule = RecurrenceRule::builder(Pattern::monthly_on_day(day), start)
            .interval(interval)
            .build()
            .unwrap();
        let from = start + Duration::days(offset_days);

        let times: Vec<_> = occurrences_from(&rule, from, Some(12))
            .unwrap()
            .map(|o| o.timestamp)
            .collect();

        for pair in times.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for time in &times {
            prop_assert!(*time >= from);
            if day > 0 {
                prop_assert_eq!(time.day() as i32, day);
            }
        }
    }

    /// Starting part-way through a rule matches stepping from its start
    #[test]
    fn prop_fast_forward_matches_stepping(
        days in proptest::collection::vec(0u8..7, 1..4),
        interval in 1..=3u32,
        offset_hours in 0..5000i64,
    ) {
        let start = datetime(2025, 3, 12, 7);
        let rule = RecurrenceRule::builder(Pattern::weekly(days.into_iter().map(weekday)), start)
            .interval(interval)
            .build()
            .unwrap();
        let from = start + Duration::hours(offset_hours);

        let skipped: Vec<_> = occurrences_from(&rule, from, Some(5))
            .unwrap()
            .map(|o| o.timestamp)
            .collect();
        let stepped: Vec<_> = occurrences_from(&rule, start, None)
            .unwrap()
            .map(|o| o.timestamp)
            .filter(|t| *t >= from)
            .take(5)
            .collect();

        prop_assert_eq!(skipped, stepped);
    }

    #[test]
    fn prop_fast_forward_daily_weekday_filter(
        days in proptest::collection::vec(0u8..7, 0..4),
        interval in 1..=5u32,
        offset_hours in 0..5000i64,
    ) {
        let start = datetime(2025, 3, 12, 7);
        let rule = RecurrenceRule::builder(Pattern::daily_on(days.into_iter().map(weekday)), start)
            .interval(interval)
            .build()
            .unwrap();
        check_fast_forward(&rule, start + Duration::hours(offset_hours))?;
    }

    #[test]
    fn prop_fast_forward_monthly_by_date(
        day in -31..=31i32,
        interval in 1..=6u32,
        offset_days in 0..1500i64,
    ) {
        prop_assume!(day != 0);
        let start = datetime(2024, 1, 15, 10);
        let rule = RecurrenceRule::builder(Pattern::monthly_on_day(day), start)
            .interval(interval)
            .build()
            .unwrap();
        check_fast_forward(&rule, start + Duration::days(offset_days))?;
    }

    #[test]
    fn prop_fast_forward_monthly_by_position(
        position in week_position(),
        day in 0u8..7,
        interval in 1..=6u32,
        offset_days in 0..1500i64,
    ) {
        let start = datetime(2024, 5, 2, 18);
        let rule = RecurrenceRule::builder(
            Pattern::monthly_on_weekday(position, weekday(day)),
            start,
        )
        .interval(interval)
        .build()
        .unwrap();
        check_fast_forward(&rule, start + Duration::days(offset_days))?;
    }

    #[test]
    fn prop_fast_forward_yearly_feb29(
        policy in feb29_policy(),
        interval in 1..=4u32,
        offset_days in 0..4000i64,
    ) {
        let start = datetime(2024, 2, 29, 8);
        let rule = RecurrenceRule::builder(
            Pattern::yearly([2], MonthPosition::ByDate(29)).with_feb29(policy),
            start,
        )
        .interval(interval)
        .build()
        .unwrap();
        check_fast_forward(&rule, start + Duration::days(offset_days))?;
    }

    #[test]
    fn prop_fast_forward_sub_daily(
        interval in 5..=600u32,
        offset_minutes in 0..100_000i64,
    ) {
        let start = datetime(2025, 6, 1, 6);
        let rule = RecurrenceRule::builder(Pattern::sub_daily(), start)
            .interval(interval)
            .build()
            .unwrap();
        check_fast_forward(&rule, start + Duration::minutes(offset_minutes))?;
    }

    #[test]
    fn prop_fast_forward_all_day(
        days in proptest::collection::vec(0u8..7, 1..4),
        weekly in any::<bool>(),
        interval in 1..=3u32,
        offset_hours in 0..5000i64,
    ) {
        let start = datetime(2025, 3, 12, 7);
        let days: Vec<_> = days.into_iter().map(weekday).collect();
        let pattern = if weekly {
            Pattern::weekly(days)
        } else {
            Pattern::daily_on(days)
        };
        let rule = RecurrenceRule::builder(pattern, start)
            .interval(interval)
            .all_day(true)
            .build()
            .unwrap();
        check_fast_forward(&rule, start + Duration::hours(offset_hours))?;
    }

    /// Encoded policies decode to the same policy
    #[test]
    fn prop_policy_round_trip(
        enabled in 0u32..8,
        standard in 0u32..8,
        keep in any::<bool>(),
        color in proptest::option::of(any::<(u8, u8, u8, u8)>()),
    ) {
        let mut policy = CollectionPolicy::new();
        policy.set_enabled_types(AlarmTypes::from_bits(enabled).unwrap());
        policy.set_standard_types(AlarmTypes::from_bits(standard).unwrap());
        policy.set_keep_legacy_format(keep);
        policy.set_background_color(color.map(|(r, g, b, a)| Rgba::new(r, g, b, a)));

        let decoded = CollectionPolicy::deserialize(&policy.serialized());
        prop_assert_eq!(&decoded, &policy);
        for alarm_type in AlarmType::ALL {
            prop_assert!(!decoded.is_standard(alarm_type) || decoded.is_enabled(alarm_type));
        }
    }

    /// Archiving then reactivating a UID restores it
    #[test]
    fn prop_uid_archive_round_trip(
        prefix in "[A-Za-z0-9.]{1,12}",
        suffix in "[A-Za-z0-9.]{0,12}",
    ) {
        let uid = format!("{}-{}", prefix, suffix);
        let archived = rewrite_uid(&uid, EventKind::Archived);
        prop_assert_eq!(archived.clone(), format!("{}-exp-{}", prefix, suffix));
        prop_assert_eq!(rewrite_uid(&archived, EventKind::Active), uid);
    }
}
