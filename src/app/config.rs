//! Configuration for the terminal session

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::terminal::CarriageReturnPolicy;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Terminal type announced to the shell and looked up with `infocmp`
    pub terminal_name: String,
    /// Silence (in milliseconds) after which buffered output is flushed
    pub quiescence_ms: u64,
    /// Bytes requested per raw read
    pub read_buffer_size: usize,
    /// What the `cr` capability does
    pub carriage_return: CarriageReturnPolicy,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminal_name: "linux".to_string(),
            quiescence_ms: 10,
            read_buffer_size: 4096,
            carriage_return: CarriageReturnPolicy::NewLine,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // Try to load from ~/.config/linux-term/config.json
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring {}: {}", config_path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Quiescence interval as a duration
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Get the default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("linux-term")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.terminal_name, "linux");
        assert_eq!(config.quiescence(), Duration::from_millis(10));
        assert_eq!(config.read_buffer_size, 4096);
        assert_eq!(config.carriage_return, CarriageReturnPolicy::NewLine);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{"quiescence_ms": 25, "carriage_return": "ignore"}"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.quiescence_ms, 25);
        assert_eq!(config.carriage_return, CarriageReturnPolicy::Ignore);
        assert_eq!(config.terminal_name, "linux");
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            log_filter: "linux_term=debug".to_string(),
            ..Config::default()
        };
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_config_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Json(_))));
    }
}
