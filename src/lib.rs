//! HangarBay - Curated companion-tool installer for space sim pilots
//!
//! Installs a curated catalog of third-party tools for Elite Dangerous,
//! Star Citizen and EVE Online via winget, GitHub releases, direct
//! downloads or zip archives.

pub mod catalog;
pub mod cli;
pub mod gui;
pub mod installer;
pub mod settings;
pub mod storage;

pub use catalog::Catalog;
pub use storage::paths;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "hangarbay";

/// Display name shown in the GUI and user-facing messages
pub const APP_DISPLAY_NAME: &str = "HangarBay";

/// User-Agent header for all outbound HTTP requests
pub const USER_AGENT: &str = concat!("hangarbay/", env!("CARGO_PKG_VERSION"));

/// GitHub API root for release lookups
pub const GITHUB_API_ROOT: &str = "https://api.github.com/repos";

/// Default catalog filename
pub const CATALOG_FILENAME: &str = "apps.json";
