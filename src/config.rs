// src/config.rs

use crate::errors::{LoupeError, LoupeResult};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/";
pub const DEFAULT_PAGE_LENGTH: usize = 500;

/// Application configuration.
///
/// Constructed once in `main` and passed down explicitly to whatever
/// needs it (the `ApiClient` in particular). There is no global config
/// state anywhere in the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// GraphQL endpoint of the log storage gateway.
    pub endpoint: String,
    /// Optional value for the `Authorization` header on every request.
    pub authorization: Option<String>,
    /// How many records one `storageReadAt` page asks for.
    pub page_length: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            authorization: None,
            page_length: DEFAULT_PAGE_LENGTH,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config file (creating it with defaults when missing),
    /// then applies `LOUPE_*` environment overrides and validates.
    pub fn load() -> LoupeResult<Self> {
        let path = config_path()?;
        let mut config = if path.exists() {
            Self::read_from(&path)?
        } else {
            let config = Config::default();
            config.write_to(&path)?;
            config
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn read_from(path: &Path) -> LoupeResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| LoupeError::config(format!("failed to read config file: {}", e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| LoupeError::config(format!("failed to parse config: {}", e)))
    }

    pub fn write_to(&self, path: &Path) -> LoupeResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LoupeError::config(format!("failed to create config dir: {}", e)))?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| LoupeError::config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, raw)
            .map_err(|e| LoupeError::config(format!("failed to write config file: {}", e)))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = env::var("LOUPE_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Ok(auth) = env::var("LOUPE_AUTHORIZATION") {
            self.authorization = Some(auth);
        }
        if let Ok(len) = env::var("LOUPE_PAGE_LENGTH") {
            if let Ok(len) = len.parse() {
                self.page_length = len;
            }
        }
        if let Ok(level) = env::var("LOUPE_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> LoupeResult<()> {
        if self.endpoint.is_empty() {
            return Err(LoupeError::config("endpoint is required"));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(LoupeError::config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if self.page_length == 0 {
            return Err(LoupeError::config("page_length must be greater than 0"));
        }
        Ok(())
    }
}

fn config_path() -> LoupeResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LoupeError::config("could not determine home directory"))?;
    Ok(home.join(".config").join("loupe").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_empty_endpoint() {
        let mut config = Config::default();
        config.endpoint = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.endpoint = "ws://localhost:9001/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_page_length() {
        let mut config = Config::default();
        config.page_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.endpoint = "https://logs.example.com/graphql".to_string();
        config.authorization = Some("Bearer abc".to_string());
        config.write_to(&path).unwrap();

        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded.endpoint, "https://logs.example.com/graphql");
        assert_eq!(loaded.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(loaded.page_length, DEFAULT_PAGE_LENGTH);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::read_from(&path).is_err());
    }
}
