//! List command implementation

use crate::catalog::CatalogError;
use crate::storage::{LedgerError, load_ledger, paths};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    #[error("Ledger error: {0}")]
    LedgerError(#[from] LedgerError),
}

/// List catalog entries with their install method and installed state
pub fn list_apps() -> Result<(), ListError> {
    let settings = crate::settings::load_settings().unwrap_or_default();
    let catalog = super::load_catalog(&settings)?;
    let installed = load_ledger(&paths::ledger_path())?;

    if catalog.apps.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    if !catalog.metadata.name.is_empty() {
        println!(
            "{} (catalog v{}, updated {})",
            catalog.metadata.name, catalog.metadata.version, catalog.metadata.updated
        );
        println!();
    }

    for app in &catalog.apps {
        let method = app.primary_method();
        let mut flags = Vec::new();
        if !app.optional {
            flags.push("default");
        }
        if app.requires_admin {
            flags.push("admin");
        }
        if installed.iter().any(|i| i.id == app.id) {
            flags.push("installed");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        };

        println!("  {} ({})  via {}{}", app.name, app.id, method.kind, flags);
        if !app.description.is_empty() {
            println!("      {}", app.description);
        }
    }

    Ok(())
}
