//! Application configuration management.
//!
//! This module handles loading the Spoolman connection settings:
//! the server host and the request timeout.
//!
//! Configuration is stored at `~/.config/spoolsync/config.json`; the
//! `SPOOLMAN_HOST` and `SPOOLMAN_TIMEOUT_SECS` environment variables take
//! precedence over the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for the config directory path
const APP_NAME: &str = "spoolsync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Spoolman's default listen address
pub const DEFAULT_HOST: &str = "http://localhost:7912";

/// HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const HOST_ENV: &str = "SPOOLMAN_HOST";
pub const TIMEOUT_ENV: &str = "SPOOLMAN_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// File config (or defaults if unreadable) with environment overrides
    pub fn resolve() -> Self {
        let config = Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Self::default()
        });
        config.with_overrides(std::env::var(HOST_ENV).ok(), std::env::var(TIMEOUT_ENV).ok())
    }

    pub fn with_overrides(mut self, host: Option<String>, timeout_secs: Option<String>) -> Self {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(raw) = timeout_secs {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_ENV),
            }
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
