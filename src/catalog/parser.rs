//! Catalog parsing functions

use super::schema::Catalog;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid catalog: {0}")]
    ValidationError(String),

    #[error("Catalog not found: {0}")]
    NotFound(String),
}

/// Parse a catalog from a JSON file
pub fn parse_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_catalog_str(&content)
}

/// Parse a catalog from a JSON string
pub fn parse_catalog_str(content: &str) -> Result<Catalog, CatalogError> {
    let catalog: Catalog = serde_json::from_str(content)?;
    Ok(catalog)
}

/// Parse a catalog from a URL
pub fn parse_catalog_url(url: &str) -> Result<Catalog, CatalogError> {
    let mut resp = ureq::get(url)
        .header("User-Agent", crate::USER_AGENT)
        .call()
        .map_err(|e| CatalogError::ValidationError(format!("HTTP error: {}", e)))?;

    let content = resp
        .body_mut()
        .read_to_string()
        .map_err(|e| CatalogError::ValidationError(format!("Failed to read response: {}", e)))?;

    parse_catalog_str(&content)
}
