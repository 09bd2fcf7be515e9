// Event module
// Alarm events as seen through the calendar storage layer

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceResult;
use crate::models::occurrence::Occurrence;
use crate::models::recurrence::RecurrenceRule;
use crate::services::occurrence;

mod status;

pub use status::{EventKind, EventStatus};

/// What the storage layer must expose for status tagging.
pub trait CalendarEvent {
    fn uid(&self) -> &str;
    fn alarms(&self) -> &[Alarm];
    fn custom_property(&self, name: &str) -> Option<&str>;
    fn set_custom_property(&mut self, name: &str, value: String);
    fn remove_custom_property(&mut self, name: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmAction {
    Display,
    Command,
    Email,
    Audio,
}

/// One alarm attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub action: AlarmAction,
    /// Message text, command line, email body or sound file, by action.
    pub text: String,
}

impl Alarm {
    pub fn new(action: AlarmAction, text: impl Into<String>) -> Self {
        Self {
            action,
            text: text.into(),
        }
    }
}

/// Stored alarm event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmEvent {
    pub uid: String,
    pub start: NaiveDateTime,
    pub alarms: Vec<Alarm>,
    pub recurrence: Option<RecurrenceRule>,
    pub custom_properties: BTreeMap<String, String>,
}

impl AlarmEvent {
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Next trigger strictly after `after`.
    pub fn next_trigger(&self, after: NaiveDateTime) -> RecurrenceResult<Option<NaiveDateTime>> {
        match &self.recurrence {
            Some(rule) => Ok(occurrence::next_after(rule, after)?.map(|o: Occurrence| o.timestamp)),
            None => Ok((self.start > after).then_some(self.start)),
        }
    }
}

impl CalendarEvent for AlarmEvent {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    fn custom_property(&self, name: &str) -> Option<&str> {
        self.custom_properties.get(name).map(String::as_str)
    }

    fn set_custom_property(&mut self, name: &str, value: String) {
        self.custom_properties.insert(name.to_string(), value);
    }

    fn remove_custom_property(&mut self, name: &str) {
        self.custom_properties.remove(name);
    }
}

/// Builder for creating alarm events with optional fields
#[derive(Default)]
pub struct EventBuilder {
    uid: Option<String>,
    start: Option<NaiveDateTime>,
    alarms: Vec<Alarm>,
    recurrence: Option<RecurrenceRule>,
    custom_properties: BTreeMap<String, String>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unique identifier
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set the first trigger time
    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn alarm(mut self, alarm: Alarm) -> Self {
        self.alarms.push(alarm);
        self
    }

    /// Attach a recurrence; the event start is taken from the rule if unset
    pub fn recurrence(mut self, rule: RecurrenceRule) -> Self {
        self.recurrence = Some(rule);
        self
    }

    pub fn custom_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_properties.insert(name.into(), value.into());
        self
    }

    /// Build the event
    pub fn build(self) -> Result<AlarmEvent, String> {
        let uid = self.uid.ok_or("Event UID is required")?;
        if uid.trim().is_empty() {
            return Err("Event UID cannot be empty".to_string());
        }

        let start = self
            .start
            .or_else(|| self.recurrence.as_ref().map(RecurrenceRule::start))
            .ok_or("Event start time is required")?;

        Ok(AlarmEvent {
            uid,
            start,
            alarms: self.alarms,
            recurrence: self.recurrence,
            custom_properties: self.custom_properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recurrence::Pattern;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_builder_missing_uid() {
        let result = AlarmEvent::builder().start(start()).build();
        assert_eq!(result.unwrap_err(), "Event UID is required");
    }

    #[test]
    fn test_builder_blank_uid() {
        let result = AlarmEvent::builder().uid("  ").start(start()).build();
        assert_eq!(result.unwrap_err(), "Event UID cannot be empty");
    }

    #[test]
    fn test_builder_missing_start() {
        let result = AlarmEvent::builder().uid("KAlarm-1").build();
        assert_eq!(result.unwrap_err(), "Event start time is required");
    }

    #[test]
    fn test_start_taken_from_recurrence() {
        let rule = RecurrenceRule::builder(Pattern::daily(), start()).build().unwrap();
        let event = AlarmEvent::builder().uid("KAlarm-1").recurrence(rule).build().unwrap();
        assert_eq!(event.start, start());
        assert!(event.is_recurring());
    }

    #[test]
    fn test_custom_properties() {
        let mut event = AlarmEvent::builder()
            .uid("KAlarm-1")
            .start(start())
            .custom_property("X-KDE-KALARM-TYPE", "ACTIVE")
            .build()
            .unwrap();

        assert_eq!(event.custom_property("X-KDE-KALARM-TYPE"), Some("ACTIVE"));
        event.set_custom_property("X-KDE-KALARM-TYPE", "ARCHIVED".to_string());
        assert_eq!(event.custom_property("X-KDE-KALARM-TYPE"), Some("ARCHIVED"));
        event.remove_custom_property("X-KDE-KALARM-TYPE");
        assert_eq!(event.custom_property("X-KDE-KALARM-TYPE"), None);
    }

    #[test]
    fn test_next_trigger_single_shot() {
        let event = AlarmEvent::builder()
            .uid("KAlarm-1")
            .start(start())
            .alarm(Alarm::new(AlarmAction::Display, "Stand up"))
            .build()
            .unwrap();

        assert_eq!(event.next_trigger(start() - Duration::hours(1)).unwrap(), Some(start()));
        assert_eq!(event.next_trigger(start()).unwrap(), None);
    }

    #[test]
    fn test_next_trigger_recurring() {
        let rule = RecurrenceRule::builder(Pattern::daily(), start()).build().unwrap();
        let event = AlarmEvent::builder().uid("KAlarm-1").recurrence(rule).build().unwrap();

        assert_eq!(
            event.next_trigger(start()).unwrap(),
            Some(start() + Duration::days(1))
        );
    }
}
