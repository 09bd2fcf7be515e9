// Test fixtures - reusable test data
// Provides consistent dates, rules and databases across integration tests

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use kalarm_core::models::collection::{AlarmType, Collection, Compatibility, CompatibilityAttribute};
use kalarm_core::services::database::Database;

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// Monday 6 January 2025, 09:00
    pub fn monday_morning_2025() -> NaiveDateTime {
        at(2025, 1, 6, 9, 0)
    }

    /// 29 February 2024 (leap year), 12:00
    pub fn leap_day_2024() -> NaiveDateTime {
        at(2024, 2, 29, 12, 0)
    }
}

/// A database file inside a temporary directory that lives as long as the fixture.
pub struct TempDatabase {
    pub dir: TempDir,
    pub db: Database,
}

impl TempDatabase {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(Self::path_in(&dir).to_str().unwrap()).unwrap();
        db.initialize_schema().unwrap();
        Self { dir, db }
    }

    pub fn path(&self) -> std::path::PathBuf {
        Self::path_in(&self.dir)
    }

    pub fn reopen(&self) -> Database {
        let db = Database::new(self.path().to_str().unwrap()).unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn path_in(dir: &TempDir) -> std::path::PathBuf {
        dir.path().join("kalarm.db")
    }
}

/// A writable collection accepting the given alarm types.
pub fn collection(name: &str, types: &[AlarmType]) -> Collection {
    let mut collection = Collection::new(name);
    collection.policy.set_enabled_types(types.iter().copied().collect());
    collection.compatibility = CompatibilityAttribute::new(Compatibility::Current, 0);
    collection
}
