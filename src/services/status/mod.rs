//! Event status classification.
//!
//! Current data records an event's kind in the `X-KDE-KALARM-TYPE` custom
//! property as `KIND` or `KIND;PARAM`. Older data embedded a marker in the
//! UID instead (`-exp-`, `-disp-`, `-tmpl-`).

use crate::models::event::{CalendarEvent, EventKind, EventStatus};

pub const STATUS_PROPERTY: &str = "X-KDE-KALARM-TYPE";

pub const ARCHIVED_UID: &str = "-exp-";
pub const DISPLAYING_UID: &str = "-disp-";
pub const TEMPLATE_UID: &str = "-tmpl-";

const STATUS_NAMES: [(EventKind, &str); 4] = [
    (EventKind::Active, "ACTIVE"),
    (EventKind::Template, "TEMPLATE"),
    (EventKind::Archived, "ARCHIVED"),
    (EventKind::Displaying, "DISPLAYING"),
];

fn kind_from_name(name: &str) -> Option<EventKind> {
    STATUS_NAMES
        .iter()
        .find(|(_, text)| *text == name)
        .map(|(kind, _)| *kind)
}

fn name_of(kind: EventKind) -> Option<&'static str> {
    STATUS_NAMES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, text)| *text)
}

/// Index of a legacy marker, ignoring a match at the very start of the UID.
fn marker_index(uid: &str, marker: &str) -> Option<usize> {
    uid.find(marker).filter(|&i| i > 0)
}

/// Determine an event's status.
///
/// An event without alarms is always `Empty`. A status property that is set
/// but unrecognised also yields `Empty`; the UID markers are consulted only
/// when the property is absent.
pub fn classify<E: CalendarEvent + ?Sized>(event: &E) -> EventStatus {
    if event.alarms().is_empty() {
        return EventStatus::new(EventKind::Empty);
    }

    match event.custom_property(STATUS_PROPERTY) {
        Some(property) if !property.is_empty() => parse_property(property),
        _ => EventStatus::new(kind_from_uid(event.uid())),
    }
}

fn parse_property(property: &str) -> EventStatus {
    if let Some(kind) = kind_from_name(property) {
        return EventStatus::new(kind);
    }

    let recognised = property
        .split_once(';')
        .and_then(|(name, param)| kind_from_name(name).map(|kind| (kind, param)));

    match recognised {
        Some((kind, "")) => EventStatus::new(kind),
        Some((kind, param)) => EventStatus::with_parameter(kind, param),
        None => {
            log::warn!("Unrecognised {} value '{}'", STATUS_PROPERTY, property);
            EventStatus::new(EventKind::Empty)
        }
    }
}

/// Legacy classification from UID markers alone.
pub fn kind_from_uid(uid: &str) -> EventKind {
    if marker_index(uid, ARCHIVED_UID).is_some() {
        EventKind::Archived
    } else if marker_index(uid, TEMPLATE_UID).is_some() {
        EventKind::Template
    } else {
        EventKind::Active
    }
}

/// Write an event's status property. `Empty` removes the property.
pub fn set_status<E: CalendarEvent + ?Sized>(event: &mut E, kind: EventKind, param: Option<&str>) {
    let Some(name) = name_of(kind) else {
        event.remove_custom_property(STATUS_PROPERTY);
        return;
    };

    let text = match param {
        Some(param) if !param.is_empty() => format!("{};{}", name, param),
        _ => name.to_string(),
    };
    event.set_custom_property(STATUS_PROPERTY, text);
}

/// Rewrite a UID's embedded marker for a new kind.
///
/// Archived and displaying kinds have their own markers; every other kind
/// uses a bare `-`. Without a marker, the last `-` is the one replaced.
/// UIDs with no replaceable position are returned unchanged.
pub fn rewrite_uid(id: &str, kind: EventKind) -> String {
    let (old_kind, index, len) = if let Some(i) = marker_index(id, ARCHIVED_UID) {
        (EventKind::Archived, i, ARCHIVED_UID.len())
    } else if let Some(i) = marker_index(id, DISPLAYING_UID) {
        (EventKind::Displaying, i, DISPLAYING_UID.len())
    } else {
        match id.rfind('-') {
            Some(i) => (EventKind::Active, i, 1),
            None => (EventKind::Active, id.len(), 0),
        }
    };

    if kind == old_kind || index == 0 {
        return id.to_string();
    }

    let part = match kind {
        EventKind::Archived => ARCHIVED_UID,
        EventKind::Displaying => DISPLAYING_UID,
        EventKind::Active | EventKind::Template | EventKind::Empty => "-",
    };

    let mut result = String::with_capacity(id.len() + part.len());
    result.push_str(&id[..index]);
    result.push_str(part);
    result.push_str(&id[index + len..]);
    result
}
