//! User settings for iSaveMoney
//!
//! Stored as `config.json` in the base directory. Every field has a serde
//! default so older files keep loading as settings are added.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use super::paths::SavePaths;
use crate::error::{SaveError, SaveResult};
use crate::models::Currency;

/// User settings for iSaveMoney
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency for new amounts and for unlimited categories in budget reports
    #[serde(default = "default_currency")]
    pub base_currency: Currency,

    /// Default forecast horizon in days
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Whether commands are written to the audit log
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> Currency {
    Currency::USD
}

fn default_forecast_days() -> u32 {
    90
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_currency: default_currency(),
            forecast_days: default_forecast_days(),
            date_format: default_date_format(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &SavePaths) -> SaveResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Not saved here; callers decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| SaveError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| SaveError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SavePaths) -> SaveResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SaveError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SaveError::Io(format!("Failed to write settings file: {}", e)))
    }

    /// Set one setting from its text form, as used by `isave config set`
    pub fn set(&mut self, key: &str, value: &str) -> SaveResult<()> {
        match key {
            "base_currency" => self.base_currency = Currency::new(value)?,
            "forecast_days" => {
                self.forecast_days = value.parse().map_err(|_| {
                    SaveError::Config(format!("forecast_days must be a number, got '{}'", value))
                })?
            }
            "date_format" => {
                let invalid = StrftimeItems::new(value).any(|item| matches!(item, Item::Error));
                if value.trim().is_empty() || invalid {
                    return Err(SaveError::Config(format!("Invalid date_format '{}'", value)));
                }
                self.date_format = value.to_string()
            }
            "audit_enabled" => {
                self.audit_enabled = value.parse().map_err(|_| {
                    SaveError::Config(format!("audit_enabled must be true or false, got '{}'", value))
                })?
            }
            other => return Err(SaveError::Config(format!("Unknown setting: {}", other))),
        }
        Ok(())
    }
}
