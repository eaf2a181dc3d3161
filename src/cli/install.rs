//! Install command implementation

use crate::catalog::{self, AppEntry, Catalog, CatalogError, InstallKind};
use crate::installer::{
    EventSender, Installer, InstallerEvent, LogLevel, SystemRunner, UreqFetcher,
};
use crate::settings::Settings;
use crate::storage::{self, paths};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::mpsc::channel;
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Install failed: {0}")]
    Failed(String),
}

/// Load the configured catalog: explicit override (path or URL), the data
/// directory copy, or an apps.json next to the executable's working dir
pub fn load_catalog(settings: &Settings) -> Result<Catalog, CatalogError> {
    let catalog = match settings.catalog.as_deref() {
        Some(src) if src.starts_with("http://") || src.starts_with("https://") => {
            catalog::parse_catalog_url(src)?
        }
        Some(src) => catalog::parse_catalog_file(Path::new(src))?,
        None => {
            let path = paths::catalog_path();
            if path.exists() {
                catalog::parse_catalog_file(&path)?
            } else {
                catalog::parse_catalog_file(Path::new(crate::CATALOG_FILENAME))?
            }
        }
    };
    catalog::validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Install the given app ids; with none given the non-optional set is
/// installed, with `--all` every entry is
pub fn install_apps(ids: &[String], all: bool) -> Result<(), InstallError> {
    let settings = crate::settings::load_settings().unwrap_or_default();
    let catalog = load_catalog(&settings)?;

    let selected = select_entries(&catalog, ids, all)?;
    if selected.is_empty() {
        return Err(InstallError::Failed(
            "nothing selected; pass app ids or --all".into(),
        ));
    }

    warn_if_winget_missing(&selected);
    paths::ensure_dirs()?;

    println!(
        "[{}] Installing {} application(s)...",
        crate::APP_NAME,
        selected.len()
    );

    let (tx, rx) = channel();
    let installer = Installer::new(
        Box::new(UreqFetcher::new()),
        Box::new(SystemRunner),
        settings.effective_download_dir(),
        EventSender::new(tx),
    );

    // The batch runs on a worker thread; this thread renders the stream
    let worker = thread::spawn(move || installer.run_batch(&selected));

    let ledger_path = paths::ledger_path();
    let mut bar: Option<ProgressBar> = None;

    for event in rx {
        match event {
            InstallerEvent::Log(line) => {
                let text = match line.level {
                    LogLevel::Error => format!("[{}] ERROR {}", line.timestamp, line.message),
                    LogLevel::Warning => format!("[{}] WARN  {}", line.timestamp, line.message),
                    LogLevel::Success => format!("[{}] OK    {}", line.timestamp, line.message),
                    LogLevel::Info => format!("[{}] {}", line.timestamp, line.message),
                };
                match &bar {
                    Some(pb) => pb.println(text),
                    None => println!("{}", text),
                }
            }
            InstallerEvent::Download { downloaded, total } => {
                if total == 0 {
                    continue;
                }
                if downloaded >= total {
                    if let Some(pb) = bar.take() {
                        pb.finish_and_clear();
                    }
                    continue;
                }
                let pb = bar.get_or_insert_with(|| {
                    let pb = ProgressBar::new(total);
                    pb.set_style(ProgressStyle::default_bar()
                        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                        .unwrap()
                        .progress_chars("#>-"));
                    pb
                });
                pb.set_position(downloaded);
            }
            InstallerEvent::AppResult { id, name, success } => {
                if success {
                    if let Err(e) = storage::record_install(&ledger_path, &id, &name) {
                        log::warn!("could not update ledger: {}", e);
                    }
                }
            }
            InstallerEvent::Done { completed, total } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
                println!(
                    "[{}] Installed {}/{} applications",
                    crate::APP_NAME,
                    completed,
                    total
                );
            }
            InstallerEvent::Progress(_) | InstallerEvent::Status(_) => {}
        }
    }

    worker
        .join()
        .map_err(|_| InstallError::Failed("installer thread panicked".into()))?;

    Ok(())
}

fn select_entries(
    catalog: &Catalog,
    ids: &[String],
    all: bool,
) -> Result<Vec<AppEntry>, InstallError> {
    if all {
        return Ok(catalog.apps.clone());
    }

    if ids.is_empty() {
        // Default selection mirrors the GUI: everything not marked optional
        return Ok(catalog
            .apps
            .iter()
            .filter(|a| !a.optional)
            .cloned()
            .collect());
    }

    let mut selected = Vec::with_capacity(ids.len());
    for id in ids {
        let entry = catalog
            .apps
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| InstallError::Failed(format!("unknown app id: {}", id)))?;
        selected.push(entry.clone());
    }
    Ok(selected)
}

fn warn_if_winget_missing(selected: &[AppEntry]) {
    let needs_winget = selected
        .iter()
        .any(|a| a.primary_method().install_kind() == Some(InstallKind::Winget));

    if needs_winget && which::which("winget").is_err() {
        println!(
            "[{}] Warning: winget not found on PATH; winget installs will fail",
            crate::APP_NAME
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(optional_flags: &[(&str, bool)]) -> Catalog {
        Catalog {
            apps: optional_flags
                .iter()
                .map(|(id, optional)| AppEntry {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                    install_type: Some("winget".into()),
                    winget_id: Some(format!("Vendor.{}", id)),
                    optional: *optional,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn default_selection_is_the_non_optional_set() {
        let catalog = catalog_with(&[("core", false), ("extra", true)]);
        let selected = select_entries(&catalog, &[], false).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "core");
    }

    #[test]
    fn all_selects_everything() {
        let catalog = catalog_with(&[("core", false), ("extra", true)]);
        let selected = select_entries(&catalog, &[], true).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn explicit_ids_preserve_request_order() {
        let catalog = catalog_with(&[("a", true), ("b", true), ("c", true)]);
        let ids = vec!["c".to_string(), "a".to_string()];
        let selected = select_entries(&catalog, &ids, false).unwrap();
        let got: Vec<&str> = selected.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a"]);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let catalog = catalog_with(&[("a", true)]);
        let ids = vec!["nope".to_string()];
        assert!(select_entries(&catalog, &ids, false).is_err());
    }
}
