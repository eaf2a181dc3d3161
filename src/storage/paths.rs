//! Directory path management for HangarBay

use std::path::PathBuf;

/// Get the base data directory (~/.local/share/hangarbay or equivalent)
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(crate::APP_NAME)
}

/// Get the default download directory (~/Downloads/HangarBay)
pub fn download_dir() -> PathBuf {
    dirs::download_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Downloads")
        })
        .join(crate::APP_DISPLAY_NAME)
}

/// Get the local catalog path
pub fn catalog_path() -> PathBuf {
    data_dir().join(crate::CATALOG_FILENAME)
}

/// Get the settings file path
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.toml")
}

/// Get the installed-apps ledger path
pub fn ledger_path() -> PathBuf {
    data_dir().join("installed.json")
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir())?;
    std::fs::create_dir_all(download_dir())?;
    Ok(())
}
