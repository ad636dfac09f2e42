//! Configuration file parser for the service.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! All fields use `#[serde(default)]` so any subset of keys can be specified;
//! missing keys fall back to the built-in defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level service configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind: String,

    /// Discovery cache capacity (entries).
    pub discovery_cache_capacity: usize,
    /// Discovery cache TTL in seconds.
    pub discovery_cache_ttl_secs: u64,

    /// Normalized feed cache capacity (entries).
    pub feed_cache_capacity: usize,
    /// Normalized feed cache TTL in seconds.
    pub feed_cache_ttl_secs: u64,

    /// Proxied image cache capacity (entries).
    pub image_cache_capacity: usize,
    /// Proxied image cache TTL in seconds.
    pub image_cache_ttl_secs: u64,

    /// Timeout for the autodiscovery GET against a site's home page.
    pub discovery_timeout_secs: u64,

    /// Per-path timeout for common-path HEAD probes.
    pub probe_timeout_secs: u64,

    /// Timeout for fetching a feed document.
    pub feed_timeout_secs: u64,

    /// Timeout for fetching a proxied image.
    pub image_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            discovery_cache_capacity: 500,
            discovery_cache_ttl_secs: 24 * 60 * 60,
            feed_cache_capacity: 500,
            feed_cache_ttl_secs: 15 * 60,
            image_cache_capacity: 300,
            image_cache_ttl_secs: 24 * 60 * 60,
            discovery_timeout_secs: 10,
            probe_timeout_secs: 5,
            feed_timeout_secs: 15,
            image_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), bind = %config.bind, "Loaded configuration");
        Ok(config)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}
