//! Institution and week-shape configuration.
//!
//! Loaded from TOML by the calling service and handed to the exporter,
//! which uses it for the document header and the day/hour lists. Day and
//! hour indices everywhere in this crate are zero-based offsets into
//! `days` and `0..periods_per_day`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableConfig {
    pub institution_name: String,
    /// Free-text comment carried into the exported document header.
    #[serde(default)]
    pub comments: Option<String>,
    /// Day names in week order; day index 0 is the first entry.
    #[serde(default = "default_days")]
    pub days: Vec<String>,
    /// Teaching periods per day; hour index 0 is the first period.
    #[serde(default = "default_periods_per_day")]
    pub periods_per_day: u32,
}

fn default_days() -> Vec<String> {
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_periods_per_day() -> u32 {
    8
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            institution_name: "Unnamed school".to_string(),
            comments: None,
            days: default_days(),
            periods_per_day: default_periods_per_day(),
        }
    }
}

impl TimetableConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: TimetableConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn days_per_week(&self) -> u32 {
        self.days.len() as u32
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one day per week is required".to_string(),
            ));
        }
        if self.periods_per_day == 0 {
            return Err(ConfigError::Invalid(
                "at least one period per day is required".to_string(),
            ));
        }
        if self.institution_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "institution_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
