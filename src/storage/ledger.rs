//! Installed-apps ledger
//!
//! Presentation-side record of successful installs; the dispatcher itself
//! never reads or writes it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse ledger: {0}")]
    ParseError(String),
}

/// One successfully installed app
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledApp {
    pub id: String,
    pub name: String,
    pub installed_date: Option<String>,
}

/// Load the ledger; a missing file is an empty ledger
pub fn load_ledger(path: &Path) -> Result<Vec<InstalledApp>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| LedgerError::ParseError(e.to_string()))
}

/// Record a successful install, replacing any previous entry with the same id
pub fn record_install(path: &Path, id: &str, name: &str) -> Result<(), LedgerError> {
    let mut apps = load_ledger(path).unwrap_or_default();
    apps.retain(|a| a.id != id);
    apps.push(InstalledApp {
        id: id.to_string(),
        name: name.to_string(),
        installed_date: Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    });

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&apps)
        .map_err(|e| LedgerError::ParseError(e.to_string()))?;
    fs::write(path, content)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ledger_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let apps = load_ledger(&dir.path().join("installed.json")).unwrap();
        assert!(apps.is_empty());
    }

    #[test]
    fn reinstall_replaces_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("installed.json");

        record_install(&path, "edmc", "EDMarketConnector").unwrap();
        record_install(&path, "hud", "Exiles HUD").unwrap();
        record_install(&path, "edmc", "EDMarketConnector").unwrap();

        let apps = load_ledger(&path).unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps.iter().filter(|a| a.id == "edmc").count(), 1);
        assert!(apps.iter().all(|a| a.installed_date.is_some()));
    }
}
