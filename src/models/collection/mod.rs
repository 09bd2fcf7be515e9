//! Collection model: storage containers for alarm events and the per-type
//! policy deciding which alarms they accept.

use serde::{Deserialize, Serialize};

use crate::models::event::EventKind;

/// A single alarm type a collection can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlarmType {
    Active,
    Archived,
    Template,
}

impl AlarmType {
    pub const ALL: [AlarmType; 3] = [AlarmType::Active, AlarmType::Archived, AlarmType::Template];

    /// Bit used for this type in the persisted bitmask.
    pub const fn bit(self) -> u32 {
        match self {
            AlarmType::Active => 1,
            AlarmType::Archived => 2,
            AlarmType::Template => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AlarmType::Active => "active",
            AlarmType::Archived => "archived",
            AlarmType::Template => "template",
        }
    }
}

/// A set of alarm types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmTypes(u32);

impl AlarmTypes {
    pub const EMPTY: AlarmTypes = AlarmTypes(0);
    pub const ALL_BITS: u32 = 1 | 2 | 4;

    /// Accepts only masks made of known type bits.
    pub fn from_bits(bits: u32) -> Option<Self> {
        (bits & !Self::ALL_BITS == 0).then_some(AlarmTypes(bits))
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, alarm_type: AlarmType) -> bool {
        self.0 & alarm_type.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, alarm_type: AlarmType) {
        self.0 |= alarm_type.bit();
    }

    pub fn remove(&mut self, alarm_type: AlarmType) {
        self.0 &= !alarm_type.bit();
    }

    pub fn intersection(&self, other: AlarmTypes) -> AlarmTypes {
        AlarmTypes(self.0 & other.0)
    }

    pub fn is_subset(&self, other: AlarmTypes) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = AlarmType> + '_ {
        AlarmType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<AlarmType> for AlarmTypes {
    fn from_iter<I: IntoIterator<Item = AlarmType>>(iter: I) -> Self {
        let mut types = AlarmTypes::EMPTY;
        for alarm_type in iter {
            types.insert(alarm_type);
        }
        types
    }
}

impl From<AlarmType> for AlarmTypes {
    fn from(alarm_type: AlarmType) -> Self {
        AlarmTypes(alarm_type.bit())
    }
}

impl std::fmt::Display for AlarmTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<_> = self.iter().map(|t| t.name()).collect();
        write!(f, "{}", names.join(","))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

/// Per-collection alarm type policy and display flags.
///
/// Invariant: `standard` is always a subset of `enabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPolicy {
    enabled: AlarmTypes,
    standard: AlarmTypes,
    background_color: Option<Rgba>,
    keep_legacy_format: bool,
}

impl CollectionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled_types(&self) -> AlarmTypes {
        self.enabled
    }

    pub fn standard_types(&self) -> AlarmTypes {
        self.standard
    }

    pub fn is_enabled(&self, alarm_type: AlarmType) -> bool {
        self.enabled.contains(alarm_type)
    }

    pub fn is_standard(&self, alarm_type: AlarmType) -> bool {
        self.standard.contains(alarm_type)
    }

    /// Disabling a type also drops its standard status.
    pub fn set_enabled(&mut self, alarm_type: AlarmType, enabled: bool) {
        if enabled {
            self.enabled.insert(alarm_type);
        } else {
            self.enabled.remove(alarm_type);
            self.standard.remove(alarm_type);
        }
    }

    pub fn set_enabled_types(&mut self, types: AlarmTypes) {
        self.enabled = types;
        self.standard = self.standard.intersection(types);
    }

    /// Marks or unmarks the collection as standard for a type.
    /// Ignored when turning on a type the collection does not accept.
    pub fn set_standard(&mut self, alarm_type: AlarmType, standard: bool) {
        if !standard {
            self.standard.remove(alarm_type);
        } else if self.enabled.contains(alarm_type) {
            self.standard.insert(alarm_type);
        } else {
            log::debug!(
                "Not making collection standard for disabled type {}",
                alarm_type.name()
            );
        }
    }

    pub fn set_standard_types(&mut self, types: AlarmTypes) {
        self.standard = types.intersection(self.enabled);
    }

    pub fn background_color(&self) -> Option<Rgba> {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Option<Rgba>) {
        self.background_color = color;
    }

    pub fn keep_legacy_format(&self) -> bool {
        self.keep_legacy_format
    }

    pub fn set_keep_legacy_format(&mut self, keep: bool) {
        self.keep_legacy_format = keep;
    }

    /// Whether events of `kind` may be stored in this collection.
    pub fn accepts(&self, kind: EventKind) -> bool {
        kind.alarm_type().is_some_and(|t| self.is_enabled(t))
    }
}

/// Whether a collection's stored calendar matches the current format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compatibility {
    /// Format not yet determined.
    Unknown,
    Current,
    /// In the current format but not yet saved that way.
    Converted,
    /// In an older format that can be converted.
    Convertible,
    /// Not written by this application, or by a newer version.
    #[default]
    Incompatible,
    /// Compatibility must be checked per event.
    PerEvent,
}

impl Compatibility {
    pub const ALL_BITS: i64 = 0x1F;

    pub fn bits(&self) -> i64 {
        match self {
            Compatibility::Unknown => 0,
            Compatibility::Current => 0x02,
            Compatibility::Converted => 0x03,
            Compatibility::Convertible => 0x04,
            Compatibility::Incompatible => 0x08,
            Compatibility::PerEvent => 0x10,
        }
    }

    pub fn from_bits(bits: i64) -> Option<Self> {
        match bits {
            0 => Some(Compatibility::Unknown),
            0x02 => Some(Compatibility::Current),
            0x03 => Some(Compatibility::Converted),
            0x04 => Some(Compatibility::Convertible),
            0x08 => Some(Compatibility::Incompatible),
            0x10 => Some(Compatibility::PerEvent),
            _ => None,
        }
    }
}

/// Calendar format version of the running application.
pub const CURRENT_FORMAT: i32 = 0;
/// The stored calendar cannot be read.
pub const INCOMPATIBLE_FORMAT: i32 = -1;
/// Events in the calendar use differing formats.
pub const MIXED_FORMAT: i32 = -2;

/// Encodes a version as `major*10000 + minor*100 + patch`.
///
/// `None` when minor or patch exceed 99 or the result does not fit an `i32`.
pub fn format_version(major: u32, minor: u32, patch: u32) -> Option<i32> {
    if minor > 99 || patch > 99 {
        return None;
    }
    let encoded = major.checked_mul(10000)?.checked_add(minor * 100 + patch)?;
    i32::try_from(encoded).ok()
}

/// `major.minor.patch` text for an encoded version; empty for special values.
pub fn version_string(version: i32) -> String {
    if version <= 0 {
        return String::new();
    }
    format!("{}.{}.{}", version / 10000, version / 100 % 100, version % 100)
}

/// Format compatibility metadata of a collection's backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityAttribute {
    pub compatibility: Compatibility,
    pub version: i32,
}

impl CompatibilityAttribute {
    pub fn new(compatibility: Compatibility, version: i32) -> Self {
        Self {
            compatibility,
            version,
        }
    }

    pub fn needs_conversion(&self) -> bool {
        self.compatibility == Compatibility::Convertible
    }

    /// Whether the collection can receive alarms without conversion.
    pub fn is_writable(&self) -> bool {
        matches!(
            self.compatibility,
            Compatibility::Current | Compatibility::Converted
        )
    }
}

impl Default for CompatibilityAttribute {
    fn default() -> Self {
        Self {
            compatibility: Compatibility::Incompatible,
            version: INCOMPATIBLE_FORMAT,
        }
    }
}

/// A named storage container for alarm events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Option<i64>,
    pub name: String,
    pub location: Option<String>,
    pub policy: CollectionPolicy,
    pub compatibility: CompatibilityAttribute,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: None,
            policy: CollectionPolicy::default(),
            compatibility: CompatibilityAttribute::default(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Collection name cannot be empty".to_string());
        }
        if !self.policy.standard_types().is_subset(self.policy.enabled_types()) {
            return Err("Standard alarm types must also be enabled".to_string());
        }
        Ok(())
    }

    /// Whether new alarms of `alarm_type` may be written here.
    pub fn can_receive(&self, alarm_type: AlarmType) -> bool {
        self.policy.is_enabled(alarm_type) && self.compatibility.is_writable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn policy_with_all_standard() -> CollectionPolicy {
        let mut policy = CollectionPolicy::new();
        policy.set_enabled_types(AlarmTypes::from_bits(AlarmTypes::ALL_BITS).unwrap());
        policy.set_standard_types(AlarmTypes::from_bits(AlarmTypes::ALL_BITS).unwrap());
        policy
    }

    #[test]
    fn test_disabling_clears_standard_only_for_that_type() {
        let mut policy = policy_with_all_standard();
        policy.set_enabled(AlarmType::Archived, false);

        assert!(!policy.is_enabled(AlarmType::Archived));
        assert!(!policy.is_standard(AlarmType::Archived));
        assert_eq!(policy.enabled_types().bits(), 1 | 4);
        assert_eq!(policy.standard_types().bits(), 1 | 4);
    }

    #[test]
    fn test_enabling_does_not_make_standard() {
        let mut policy = CollectionPolicy::new();
        policy.set_enabled(AlarmType::Template, true);
        assert!(policy.is_enabled(AlarmType::Template));
        assert!(!policy.is_standard(AlarmType::Template));
    }

    #[test]
    fn test_replacing_enabled_set_intersects_standard() {
        let mut policy = policy_with_all_standard();
        policy.set_enabled_types(AlarmType::Active.into());

        assert_eq!(policy.standard_types(), AlarmTypes::from(AlarmType::Active));
    }

    #[test]
    fn test_standard_requires_enabled() {
        let mut policy = CollectionPolicy::new();
        policy.set_standard(AlarmType::Active, true);
        assert!(!policy.is_standard(AlarmType::Active));

        policy.set_enabled(AlarmType::Active, true);
        policy.set_standard(AlarmType::Active, true);
        assert!(policy.is_standard(AlarmType::Active));
        assert!(policy.standard_types().is_subset(policy.enabled_types()));

        policy.set_standard(AlarmType::Active, false);
        assert!(policy.is_enabled(AlarmType::Active));
        assert!(!policy.is_standard(AlarmType::Active));
    }

    #[test]
    fn test_set_standard_types_keeps_enabled() {
        let mut policy = CollectionPolicy::new();
        policy.set_enabled_types([AlarmType::Active, AlarmType::Template].into_iter().collect());
        policy.set_standard_types(AlarmTypes::from_bits(AlarmTypes::ALL_BITS).unwrap());

        assert_eq!(policy.enabled_types().bits(), 1 | 4);
        assert_eq!(policy.standard_types().bits(), 1 | 4);
    }

    #[test]
    fn test_alarm_types_from_bits_rejects_unknown() {
        assert!(AlarmTypes::from_bits(8).is_none());
        assert_eq!(AlarmTypes::from_bits(3).map(|t| t.to_string()), Some("active,archived".to_string()));
    }

    #[test_case(EventKind::Active, true)]
    #[test_case(EventKind::Archived, false)]
    #[test_case(EventKind::Displaying, false)]
    #[test_case(EventKind::Empty, false)]
    fn test_accepts(kind: EventKind, expected: bool) {
        let mut policy = CollectionPolicy::new();
        policy.set_enabled(AlarmType::Active, true);
        assert_eq!(policy.accepts(kind), expected);
    }

    #[test]
    fn test_version_helpers() {
        let version = format_version(2, 1, 19).unwrap();
        assert_eq!(version, 20119);
        assert_eq!(version_string(version), "2.1.19");
        assert_eq!(version_string(INCOMPATIBLE_FORMAT), "");
    }

    #[test_case(500_000, 0, 0; "major overflows")]
    #[test_case(u32::MAX, 99, 99; "major at limit")]
    #[test_case(1, 100, 0; "minor too large")]
    #[test_case(1, 0, 100; "patch too large")]
    fn test_format_version_out_of_range(major: u32, minor: u32, patch: u32) {
        assert_eq!(format_version(major, minor, patch), None);
    }

    #[test]
    fn test_compatibility_bits() {
        for compat in [
            Compatibility::Unknown,
            Compatibility::Current,
            Compatibility::Converted,
            Compatibility::Convertible,
            Compatibility::Incompatible,
            Compatibility::PerEvent,
        ] {
            assert_eq!(Compatibility::from_bits(compat.bits()), Some(compat));
        }
        assert_eq!(Compatibility::from_bits(0x06), None);
    }

    #[test]
    fn test_collection_receive_rules() {
        let mut collection = Collection::new("Personal");
        collection.policy.set_enabled(AlarmType::Active, true);
        assert!(!collection.can_receive(AlarmType::Active));

        collection.compatibility = CompatibilityAttribute::new(Compatibility::Current, CURRENT_FORMAT);
        assert!(collection.can_receive(AlarmType::Active));
        assert!(!collection.can_receive(AlarmType::Archived));
    }

    #[test]
    fn test_collection_validate() {
        assert!(Collection::new("  ").validate().is_err());
        assert!(Collection::new("Work").validate().is_ok());
    }
}
