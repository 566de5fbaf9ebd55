use crate::errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Configuration struct for the note service client
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    pub server_url: Option<String>,
    pub log_level: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            log_level: Some("info".to_string()),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a file if it exists, otherwise returns the default config
    pub fn load_from_file(path: &Path) -> ApiResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ApiError::Config(format!("Failed to read config file: {}", e)))?;

            let config: Self = toml::from_str(&content)
                .map_err(|e| ApiError::Config(format!("Failed to parse config file: {}", e)))?;

            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> ApiResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| ApiError::Config(format!("Failed to serialize config: {}", e)))?;

        // Ensure the directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)
            .map_err(|e| ApiError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            server_url: other.server_url.clone().or_else(|| self.server_url.clone()),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
            session_file: other
                .session_file
                .clone()
                .or_else(|| self.session_file.clone()),
        }
    }

    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// Path of the session file; defaults to `session.json` next to the
    /// config file.
    pub fn session_file(&self) -> ApiResult<PathBuf> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => Ok(get_default_config_dir("jot")?.join("session.json")),
        }
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> ApiResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ApiError::Config("Could not determine home directory".to_string()))?;

    let config_dir = home_dir.join(".config").join(app_name);

    Ok(config_dir)
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> ApiResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
