//! Lifecycle kinds of stored alarm events.

use serde::{Deserialize, Serialize};

use crate::models::collection::AlarmType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// No alarms, or a status the application does not recognise.
    Empty,
    Active,
    Archived,
    Template,
    /// Copy of an alarm currently shown in a message window.
    Displaying,
}

impl EventKind {
    /// The collection alarm type that stores events of this kind, if any.
    pub fn alarm_type(&self) -> Option<AlarmType> {
        match self {
            EventKind::Active => Some(AlarmType::Active),
            EventKind::Archived => Some(AlarmType::Archived),
            EventKind::Template => Some(AlarmType::Template),
            EventKind::Empty | EventKind::Displaying => None,
        }
    }
}

impl From<AlarmType> for EventKind {
    fn from(alarm_type: AlarmType) -> Self {
        match alarm_type {
            AlarmType::Active => EventKind::Active,
            AlarmType::Archived => EventKind::Archived,
            AlarmType::Template => EventKind::Template,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatus {
    pub kind: EventKind,
    pub parameter: Option<String>,
}

impl EventStatus {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            parameter: None,
        }
    }

    pub fn with_parameter(kind: EventKind, parameter: impl Into<String>) -> Self {
        Self {
            kind,
            parameter: Some(parameter.into()),
        }
    }
}
