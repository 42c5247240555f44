//! Client configuration.
//!
//! All default values live in `config.default.toml`, embedded at compile time. Callers
//! overlay their own TOML on top, and the API base URL can come from the environment.

use std::{fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

/// Embedded copy of the default configuration (single source of truth for defaults).
pub const DEFAULT_CONFIG: &str = include_str!("config.default.toml");

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "STAGEDOOR_API_URL";

/// Error that can occur when reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigReadError {
    /// The file did not exist or could not be read.
    #[error("config file not found: {0}")]
    ConfigFileNotFound(#[from] std::io::Error),
    /// The TOML was syntactically invalid.
    #[error("config file is not valid TOML: {0}")]
    ConfigFileNotValid(#[from] toml::de::Error),
    /// Failed to merge defaults with overrides.
    #[error("failed to merge embedded and user TOML: {0}")]
    ConfigMergeError(String),
    /// An environment override could not be parsed.
    #[error("invalid value in {name}: {message}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Parse failure.
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiToml {
    pub base_url: Url,
    pub request_timeout_secs: u64,
    pub user_agent_extra: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheToml {
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PollingToml {
    pub conversations_secs: u64,
    pub thread_secs: u64,
    pub notifications_secs: u64,
}

/// Route paths the SDK navigates to on its own (401 redirect, guard redirects).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoutesToml {
    pub login: String,
    pub talent_dashboard: String,
    pub recruiter_dashboard: String,
    pub verify_email: String,
}

/// The overall client configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST backend location and transport knobs.
    pub api: ApiToml,
    /// Query cache freshness and garbage collection windows.
    pub cache: CacheToml,
    /// Refetch intervals of the polled views.
    pub polling: PollingToml,
    /// Well-known application routes.
    pub routes: RoutesToml,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::from_str(DEFAULT_CONFIG).expect("Embedded config.default.toml must be valid")
    }
}

impl Default for RoutesToml {
    fn default() -> Self {
        ClientConfig::default().routes
    }
}

impl ClientConfig {
    /// Read and parse a configuration file, overlaying it on top of the embedded defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigReadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_str_with_defaults(&raw)
    }

    /// Parse a raw TOML string, overlaying it on top of the embedded defaults.
    pub fn from_str_with_defaults(raw: &str) -> Result<Self, ConfigReadError> {
        let default_val: toml::Value = DEFAULT_CONFIG
            .parse()
            .expect("embedded defaults invalid TOML");
        let user_val: toml::Value = raw.parse()?;

        let merged_val = serde_toml_merge::merge(default_val, user_val)
            .map_err(|e| ConfigReadError::ConfigMergeError(e.to_string()))?;

        Ok(merged_val.try_into()?)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigReadError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup` (the process environment in production).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigReadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            let url = Url::parse(raw.trim()).map_err(|e| ConfigReadError::InvalidEnv {
                name: API_URL_ENV,
                message: e.to_string(),
            })?;
            self.api.base_url = url;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.cache.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.cache.gc_time_secs)
    }

    /// Defaults tuned for unit tests: a local backend and a short timeout.
    pub fn test(base_url: Url) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url;
        config.api.request_timeout_secs = 5;
        config.cache.stale_time_secs = 60;
        config
    }
}

impl FromStr for ClientConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}
