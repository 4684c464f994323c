//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so a partial (or
//! absent) file still yields a usable configuration. Credentials are never
//! stored in code: the e-mail API key comes from the config file or from
//! an environment variable.

use crate::error::ConfigError;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Polling loop settings
    pub poll: PollConfig,
    /// Outbound e-mail settings
    pub email: EmailConfig,
}

/// Settings for the polling loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds to sleep between iterations
    pub interval_seconds: u64,
    /// How events are collected each iteration
    pub mode: PollMode,
}

/// How the poll loop collects events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PollMode {
    /// Query the events of the time window that passed while sleeping
    Window,
    /// Block on the live feed and notify each event as it arrives
    Live,
}

/// Settings for the outbound e-mail API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    /// Messages endpoint of the e-mail API
    pub endpoint: String,
    /// Sender address
    pub from: String,
    /// Recipient address
    pub to: String,
    /// API key; prefer the environment variable over storing it here
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            mode: PollMode::Window,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mailgun.net/v3/example.com/messages".to_string(),
            from: "noreply@example.com".to_string(),
            to: "ops@example.com".to_string(),
            api_key: None,
            api_key_env: "DOCKWATCH_API_KEY".to_string(),
        }
    }
}

impl PollConfig {
    /// The sleep interval as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl EmailConfig {
    /// Resolve the API key from the config file or the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` when neither source provides
    /// a non-empty key.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::ValidationError(format!(
                "no e-mail API key: set `email.api_key` in the config file or the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML, or
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional path, falling back to defaults
    ///
    /// A missing file produces a warning and the default configuration;
    /// an invalid file is reported and also falls back to defaults.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                info!("Loading configuration from: {}", path);
                match Self::from_file(Path::new(path)) {
                    Ok(config) => Ok(config),
                    Err(ConfigError::ReadError(_)) => {
                        warn!(
                            "Configuration file '{}' not found or unreadable, using defaults",
                            path
                        );
                        Ok(Config::default())
                    }
                    Err(e) => {
                        error!("Configuration error in '{}': {}", path, e);
                        warn!("Using default configuration due to invalid config file");
                        Ok(Config::default())
                    }
                }
            }
            None => {
                info!("Using default configuration");
                Ok(Config::default())
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "poll.interval_seconds must be at least 1".to_string(),
            ));
        }
        if self.email.endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "email.endpoint must not be empty".to_string(),
            ));
        }
        if self.email.from.is_empty() || self.email.to.is_empty() {
            return Err(ConfigError::ValidationError(
                "email.from and email.to must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
