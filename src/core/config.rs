//! Client configuration

use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::core::errors::{LaraError, Result};

/// Default API endpoint
pub const DEFAULT_SERVER_URL: &str = "https://api.laratranslate.com";

/// Default interval between import status lookups
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 2000;

/// Configuration for [`crate::LaraClient`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    /// Per-request HTTP timeout
    pub timeout_ms: u64,
    pub polling_interval_ms: u64,
    /// Upper bound for waiting on imports and documents; 0 waits forever
    pub max_wait_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout_ms: 60_000,
            polling_interval_ms: DEFAULT_POLLING_INTERVAL_MS,
            max_wait_ms: 0,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            server_url: std::env::var("LARA_SERVER_URL").unwrap_or(defaults.server_url),
            timeout_ms: env_u64("LARA_TIMEOUT_MS", defaults.timeout_ms)?,
            polling_interval_ms: env_u64(
                "LARA_POLLING_INTERVAL_MS",
                defaults.polling_interval_ms,
            )?,
            max_wait_ms: env_u64("LARA_MAX_WAIT_MS", defaults.max_wait_ms)?,
        })
    }

    /// Load from a config file; the format (JSON, TOML, YAML, INI) follows the
    /// extension and missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(config_error("server_url is required"));
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(config_error(format!(
                "server_url must be an http(s) URL: {}",
                self.server_url
            )));
        }

        if self.timeout_ms == 0 {
            return Err(config_error("timeout_ms must be greater than 0"));
        }

        if self.polling_interval_ms == 0 {
            return Err(config_error("polling_interval_ms must be greater than 0"));
        }

        if self.max_wait_ms == 0 {
            warn!("max_wait_ms is 0: import waits are unbounded");
        }

        Ok(())
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }

    /// `None` when waits are unbounded
    pub fn max_wait(&self) -> Option<Duration> {
        (self.max_wait_ms > 0).then(|| Duration::from_millis(self.max_wait_ms))
    }
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| config_error(format!("{name}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn config_error(message: impl Into<String>) -> LaraError {
    LaraError::Config {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::default();
        assert_ok!(config.validate());
        assert_eq!(config.polling_interval(), Duration::from_millis(2000));
        assert_eq!(config.max_wait(), None);
    }

    #[test]
    fn test_config_validation_bad_url() {
        let config = ClientConfig {
            server_url: "api.laratranslate.com".to_string(),
            ..Default::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_config_validation_zero_interval() {
        let config = ClientConfig {
            polling_interval_ms: 0,
            ..Default::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = ClientConfig::default().with_server_url("http://localhost:8080/");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lara.json");

        let config = ClientConfig {
            max_wait_ms: 30_000,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.max_wait(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lara.json");
        std::fs::write(&path, r#"{"server_url": "http://localhost:9000"}"#).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server_url, "http://localhost:9000");
        assert_eq!(loaded.polling_interval_ms, DEFAULT_POLLING_INTERVAL_MS);
    }

    #[test]
    fn test_toml_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lara.toml");
        std::fs::write(&path, "server_url = \"http://localhost:9000\"\nmax_wait_ms = 5000\n").unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server_url, "http://localhost:9000");
        assert_eq!(loaded.max_wait(), Some(Duration::from_secs(5)));
        assert_eq!(loaded.timeout_ms, 60_000);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = ClientConfig::from_file("/nonexistent/lara.json").unwrap_err();
        assert!(matches!(err, LaraError::Config { .. }));
    }
}
