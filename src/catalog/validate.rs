//! Catalog validation

use super::CatalogError;
use super::schema::{Catalog, InstallKind};
use std::collections::HashSet;

/// Validate a catalog for completeness and correctness
pub fn validate_catalog(catalog: &Catalog) -> Result<(), CatalogError> {
    let mut seen_ids = HashSet::new();

    for entry in &catalog.apps {
        if entry.id.is_empty() {
            return Err(CatalogError::ValidationError(
                "app id is required".into(),
            ));
        }

        if entry.name.is_empty() {
            return Err(CatalogError::ValidationError(format!(
                "app '{}': name is required",
                entry.id
            )));
        }

        if !seen_ids.insert(entry.id.as_str()) {
            return Err(CatalogError::ValidationError(format!(
                "duplicate app id: {}",
                entry.id
            )));
        }

        let method = entry.primary_method();
        if method.kind.is_empty() {
            return Err(CatalogError::ValidationError(format!(
                "app '{}': no install method declared",
                entry.id
            )));
        }

        // Field checks only for tags we know; unknown tags are left for the
        // installer to refuse at run time
        match method.install_kind() {
            Some(InstallKind::Winget) => {
                if method.winget_id.as_deref().unwrap_or("").is_empty() {
                    return Err(CatalogError::ValidationError(format!(
                        "app '{}': winget method requires winget_id",
                        entry.id
                    )));
                }
            }
            Some(InstallKind::Github) => {
                if method.github_repo.as_deref().unwrap_or("").is_empty()
                    || method.github_asset.as_deref().unwrap_or("").is_empty()
                {
                    return Err(CatalogError::ValidationError(format!(
                        "app '{}': github method requires github_repo and github_asset",
                        entry.id
                    )));
                }
            }
            Some(InstallKind::Exe) | Some(InstallKind::Msi) | Some(InstallKind::Zip) => {
                if method.url.as_deref().unwrap_or("").is_empty()
                    || method.filename.as_deref().unwrap_or("").is_empty()
                {
                    return Err(CatalogError::ValidationError(format!(
                        "app '{}': {} method requires url and filename",
                        entry.id, method.kind
                    )));
                }
            }
            Some(InstallKind::Web) => {
                if method.url.as_deref().unwrap_or("").is_empty() {
                    return Err(CatalogError::ValidationError(format!(
                        "app '{}': web method requires url",
                        entry.id
                    )));
                }
            }
            None => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{AppEntry, InstallMethod};

    fn winget_entry(id: &str) -> AppEntry {
        AppEntry {
            id: id.into(),
            name: id.to_uppercase(),
            install_type: Some("winget".into()),
            winget_id: Some(format!("Vendor.{}", id)),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_valid_catalog() {
        let catalog = Catalog {
            apps: vec![winget_entry("edmc"), winget_entry("edhm")],
            ..Default::default()
        };
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let catalog = Catalog {
            apps: vec![winget_entry("edmc"), winget_entry("edmc")],
            ..Default::default()
        };
        let err = validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("duplicate app id"));
    }

    #[test]
    fn rejects_winget_without_id() {
        let mut entry = winget_entry("edmc");
        entry.winget_id = None;
        let catalog = Catalog {
            apps: vec![entry],
            ..Default::default()
        };
        assert!(validate_catalog(&catalog).is_err());
    }

    #[test]
    fn unknown_tags_pass_validation() {
        // Unknown strategies are a run-time refusal, not a load failure
        let entry = AppEntry {
            id: "weird".into(),
            name: "Weird".into(),
            install_methods: vec![InstallMethod {
                kind: "chocolatey".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let catalog = Catalog {
            apps: vec![entry],
            ..Default::default()
        };
        assert!(validate_catalog(&catalog).is_ok());
    }
}
