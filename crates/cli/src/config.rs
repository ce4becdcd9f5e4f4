// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is read from `invsync.toml` in the working directory (or the
//! file named by `--config` / `INVSYNC_CONFIG`). Every field has a default, so
//! the file is optional. Environment variables override the file:
//! - `INVSYNC_HUB_URL`, `INVSYNC_API_URL`, `INVSYNC_QUEUE_PATH`
//! - `INVSYNC_TOKEN`: bearer credential

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::hub::{Backoff, ConnectionConfig};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "invsync.toml";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Hub WebSocket endpoint (`ws://` or `wss://`).
    pub hub_url: String,
    /// Base URL of the REST API scans are submitted to.
    pub api_url: String,
    /// Offline queue file.
    pub queue_path: PathBuf,
    /// Groups joined on every connection.
    pub groups: Vec<String>,
    /// Bearer token. Prefer `INVSYNC_TOKEN` over storing it here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub handshake_timeout_ms: u64,
    pub invoke_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    pub reconnect: ReconnectConfig,
}

/// `[reconnect]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconnectConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            jitter_ms: 1000,
            max_attempts: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hub_url: "ws://localhost:5000/hubs/inventory".to_string(),
            api_url: "http://localhost:5000".to_string(),
            queue_path: PathBuf::from(".invsync/offline_queue.jsonl"),
            groups: vec!["inventory".to_string()],
            token: None,
            handshake_timeout_ms: 10_000,
            invoke_timeout_ms: 15_000,
            submit_timeout_ms: 15_000,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Values taken from the environment, applied over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub hub_url: Option<String>,
    pub api_url: Option<String>,
    pub queue_path: Option<PathBuf>,
    pub token: Option<String>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Overrides {
            hub_url: env::hub_url(),
            api_url: env::api_url(),
            queue_path: env::queue_path(),
            token: env::token(),
        }
    }
}

impl Config {
    /// Parse a config file. The file must exist.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the effective configuration.
    ///
    /// A file named by `explicit` or `INVSYNC_CONFIG` must exist; otherwise
    /// `invsync.toml` is read if present. Environment overrides are applied
    /// last and the result is validated.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        let named = explicit.map(Path::to_path_buf).or_else(env::config_path);
        let mut config = match named {
            Some(path) => Self::load(&path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply(Overrides::from_env());
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.hub_url {
            self.hub_url = url;
        }
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(path) = overrides.queue_path {
            self.queue_path = path;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
    }

    /// Check values the types cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.hub_url.starts_with("ws://") || self.hub_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "hub_url '{}' must start with ws:// or wss://",
                self.hub_url
            )));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url '{}' must start with http:// or https://",
                self.api_url
            )));
        }
        if let Some(group) = self.groups.iter().find(|g| g.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "group name '{}' is blank",
                group
            )));
        }
        if self.reconnect.max_delay_ms < self.reconnect.base_delay_ms {
            return Err(ConfigError::Invalid(
                "reconnect.max_delay_ms must not be less than reconnect.base_delay_ms"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            base: Duration::from_millis(self.reconnect.base_delay_ms),
            max: Duration::from_millis(self.reconnect.max_delay_ms),
            jitter: Duration::from_millis(self.reconnect.jitter_ms),
        }
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.hub_url.clone(),
            backoff: self.backoff(),
            max_attempts: self.reconnect.max_attempts,
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            invoke_timeout: Duration::from_millis(self.invoke_timeout_ms),
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
