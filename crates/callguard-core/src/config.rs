//! Screening configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Default time the spam oracle gets before the call is let through.
pub const DEFAULT_SPAM_TIMEOUT_MS: u64 = 300;

/// Default time a rule snapshot read gets before the call is let through.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 1000;

const APP_DIR: &str = "callguard";

/// Settings for the screening service, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Database file; defaults to the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Spam oracle deadline in milliseconds.
    pub spam_timeout_ms: u64,
    /// Rule store read deadline in milliseconds.
    pub store_timeout_ms: u64,
    /// JSON spam list replacing the built-in one.
    pub spam_list_path: Option<PathBuf>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            spam_timeout_ms: DEFAULT_SPAM_TIMEOUT_MS,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            spam_list_path: None,
        }
    }
}

impl ScreeningConfig {
    /// Default location of the configuration file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the database file, falling back to the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the platform has no data
    /// directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join("callguard.db"))
            .ok_or_else(|| Error::Config("Could not find data directory".into()))
    }

    /// Spam oracle deadline.
    #[must_use]
    pub const fn spam_timeout(&self) -> Duration {
        Duration::from_millis(self.spam_timeout_ms)
    }

    /// Rule store read deadline.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreeningConfig::default();
        assert_eq!(config.spam_timeout(), Duration::from_millis(300));
        assert_eq!(config.store_timeout(), Duration::from_secs(1));
        assert!(config.spam_list_path.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScreeningConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, ScreeningConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"spam_timeout_ms": 150}"#).unwrap();

        let config = ScreeningConfig::load(&path).unwrap();
        assert_eq!(config.spam_timeout_ms, 150);
        assert_eq!(config.store_timeout_ms, DEFAULT_STORE_TIMEOUT_MS);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();

        assert!(matches!(ScreeningConfig::load(&path), Err(Error::Serde(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ScreeningConfig {
            database_path: Some(PathBuf::from("/tmp/rules.db")),
            ..ScreeningConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(ScreeningConfig::load(&path).unwrap(), config);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/rules.db")
        );
    }
}
