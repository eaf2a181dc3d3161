//! User settings persistence

use crate::storage::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to save settings: {0}")]
    SaveError(String),
}

/// Persisted user settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Download directory override
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Catalog file path or URL override
    #[serde(default)]
    pub catalog: Option<String>,
}

impl Settings {
    /// Download directory to use, falling back to the platform default
    pub fn effective_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(paths::download_dir)
    }
}

/// Load settings; an absent file yields the defaults
pub fn load_settings() -> Result<Settings, SettingsError> {
    let path = paths::settings_path();
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Save settings
pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    let path = paths::settings_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings)
        .map_err(|e| SettingsError::SaveError(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
