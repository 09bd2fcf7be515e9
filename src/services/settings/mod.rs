//! Loading and saving of the TOML settings file.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

const CONFIG_FILE: &str = "settings.toml";
const DATABASE_FILE: &str = "kalarm.db";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "KDE", "kalarm-core")
        .context("Could not determine the user's home directory")
}

/// Default settings file location (`<config dir>/settings.toml`).
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

/// Default database location (`<data dir>/kalarm.db`).
pub fn default_database_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(DATABASE_FILE))
}

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for the settings file in the per-user config directory.
    pub fn from_default_location() -> Result<Self> {
        Ok(Self::new(config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file; a missing file yields defaults.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::info!(
                "No settings file at {}, using defaults",
                self.path.display()
            );
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file at {}", self.path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file at {}", self.path.display()))?;

        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", self.path.display(), e))?;

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write settings file at {}", self.path.display()))?;

        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// The configured database path, or the per-user default.
pub fn database_path(settings: &Settings) -> Result<PathBuf> {
    match &settings.database_path {
        Some(path) => Ok(path.clone()),
        None => default_database_path(),
    }
}
