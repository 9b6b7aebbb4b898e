// Optional YAML configuration for the console front end

use crate::filter::TaskFilter;
use crate::models::Priority;
use chrono::format::{Item, StrftimeItems};
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// strftime pattern for the "short" creation date, e.g. `1/5/26, 9:30 AM`
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%y, %-I:%M %p";

/// Startup settings; nothing here is written back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Priority selected when the session starts
    pub default_priority: Priority,
    /// Filter tab selected when the session starts
    pub default_filter: TaskFilter,
    /// Colored console output
    pub color: bool,
    /// chrono format string for creation dates
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_priority: Priority::default(),
            default_filter: TaskFilter::default(),
            color: true,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/tasklist/config.yml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tasklist").join("config.yml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is tried
    /// and defaults are used when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse YAML text; an empty document yields defaults
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            return Err(eyre!("date_format cannot be empty"));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(eyre!("Invalid date_format: {}", self.date_format));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}
