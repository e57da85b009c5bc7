//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL override and the last used email.
//!
//! Configuration is stored at `~/.config/gymbook/config.json`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::StorageError;

/// Application name used for config/data directory paths
const APP_NAME: &str = "gymbook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API base URL when no override is configured.
const DEFAULT_API_URL: &str = "http://127.0.0.1:3333";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, StorageError> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Base URL the `ApiClient` should talk to.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    fn config_path() -> Result<PathBuf, StorageError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not find config directory",
            ))
        })?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory the credential store persists into.
    pub fn data_dir(&self) -> Result<PathBuf, StorageError> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not find data directory",
            ))
        })?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_default() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);

        let overridden = Config {
            api_url: Some("https://api.gymbook.example".to_string()),
            ..Config::default()
        };
        assert_eq!(overridden.api_url(), "https://api.gymbook.example");
    }
}
