// Settings module
// User configuration persisted as TOML

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::recurrence::Feb29Policy;

pub const MIN_PREVIEW_COUNT: usize = 1;
pub const MAX_PREVIEW_COUNT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Applied to yearly Feb-29 rules read without an explicit policy.
    pub default_feb29_policy: Feb29Policy,
    /// Collection database; the per-user data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Occurrences listed when no count is requested.
    pub preview_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_feb29_policy: Feb29Policy::Mar1,
            database_path: None,
            preview_count: 10,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_PREVIEW_COUNT..=MAX_PREVIEW_COUNT).contains(&self.preview_count) {
            return Err(format!(
                "Preview count must be between {} and {}",
                MIN_PREVIEW_COUNT, MAX_PREVIEW_COUNT
            ));
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err("Database path cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
