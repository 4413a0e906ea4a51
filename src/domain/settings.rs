//! Settings - Client Settings for the Remote Config Store
//!
//! Persisted as TOML in the platform config directory. A missing or blank
//! file means defaults.

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONFIG_PATH, DEFAULT_ERROR_PREFIX, REQUEST_TIMEOUT_SECS, USER_AGENT,
};
use crate::error::Result;
use crate::helpers::get_or_create_config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Where and how the persist call is made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the application server
    pub base_url: String,
    /// Path of the config endpoint
    pub config_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Prefix stripped from backend error messages (empty disables stripping)
    pub error_prefix: String,
    /// User agent sent with the persist call
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientSettings {
    /// Full URL of the config endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.config_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path()?)
    }

    /// Load settings from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        info!(path = ?path, "Loading settings file");
        let value = std::fs::read_to_string(path)?;

        if value.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(toml::from_str(&value)?)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_path()?)
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Path of the settings file inside the config directory
pub fn settings_path() -> Result<PathBuf> {
    Ok(get_or_create_config_dir()?.join(SETTINGS_FILE_NAME))
}
