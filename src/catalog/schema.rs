//! Catalog schema definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete catalog document structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub metadata: CatalogMetadata,
    #[serde(default)]
    pub games: BTreeMap<String, GameInfo>,
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

/// Catalog metadata block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub updated: String,
}

/// Named game grouping; presentation-only, the installer ignores it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One installable application entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,

    // Legacy single-method entries carry the type tag and its fields flat
    #[serde(default)]
    pub install_type: Option<String>,
    #[serde(default)]
    pub winget_id: Option<String>,
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default)]
    pub github_asset: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub extract_to: Option<String>,

    // Newer entries declare an ordered method list instead
    #[serde(default)]
    pub install_methods: Vec<InstallMethod>,

    /// SHA-256 hex digest of the downloaded artifact; empty skips verification
    #[serde(default)]
    pub checksum: String,

    #[serde(default)]
    pub post_steps: Vec<PostStep>,

    /// Drives default selection in the front ends, not enforced here
    #[serde(default = "default_true")]
    pub optional: bool,

    /// Informational hint only; the installer never elevates
    #[serde(default)]
    pub requires_admin: bool,

    #[serde(default)]
    pub games: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl AppEntry {
    /// The method the installer runs: legacy flat fields count as the first
    /// declared method, otherwise the first `install_methods` entry.
    pub fn primary_method(&self) -> InstallMethod {
        if let Some(kind) = &self.install_type {
            return InstallMethod {
                kind: kind.clone(),
                winget_id: self.winget_id.clone(),
                github_repo: self.github_repo.clone(),
                github_asset: self.github_asset.clone(),
                url: self.url.clone(),
                filename: self.filename.clone(),
                extract_to: self.extract_to.clone(),
            };
        }
        self.install_methods.first().cloned().unwrap_or_default()
    }

    /// Expected checksum, trimmed; `None` means verification is skipped
    pub fn expected_checksum(&self) -> Option<&str> {
        let trimmed = self.checksum.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }
}

/// A single install method: a type tag plus its per-type fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallMethod {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub winget_id: Option<String>,
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default)]
    pub github_asset: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub extract_to: Option<String>,
}

impl InstallMethod {
    /// Resolve the type tag; `None` for tags the installer does not know
    pub fn install_kind(&self) -> Option<InstallKind> {
        InstallKind::from_tag(&self.kind)
    }
}

/// Strategy tag for an install method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Winget,
    Github,
    Exe,
    Msi,
    Zip,
    Web,
}

impl InstallKind {
    /// Exact-match tag lookup; no case folding, no synonyms
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "winget" => Some(Self::Winget),
            "github" => Some(Self::Github),
            "exe" => Some(Self::Exe),
            "msi" => Some(Self::Msi),
            "zip" => Some(Self::Zip),
            "web" => Some(Self::Web),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Winget => "winget",
            Self::Github => "github",
            Self::Exe => "exe",
            Self::Msi => "msi",
            Self::Zip => "zip",
            Self::Web => "web",
        }
    }
}

/// Post-install shell step; the original catalogs capitalise the keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostStep {
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Script", default)]
    pub script: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_fields_take_precedence_over_method_list() {
        let entry = AppEntry {
            id: "edmc".into(),
            name: "EDMarketConnector".into(),
            install_type: Some("winget".into()),
            winget_id: Some("EDCD.EDMarketConnector".into()),
            install_methods: vec![InstallMethod {
                kind: "zip".into(),
                url: Some("https://example.com/edmc.zip".into()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let method = entry.primary_method();
        assert_eq!(method.kind, "winget");
        assert_eq!(method.winget_id.as_deref(), Some("EDCD.EDMarketConnector"));
    }

    #[test]
    fn method_list_used_when_no_legacy_tag() {
        let entry = AppEntry {
            id: "tool".into(),
            name: "Tool".into(),
            install_methods: vec![
                InstallMethod {
                    kind: "github".into(),
                    github_repo: Some("org/tool".into()),
                    github_asset: Some("windows-x64".into()),
                    ..Default::default()
                },
                InstallMethod {
                    kind: "web".into(),
                    url: Some("https://example.com".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(entry.primary_method().kind, "github");
    }

    #[test]
    fn tag_matching_is_exact() {
        assert_eq!(InstallKind::from_tag("winget"), Some(InstallKind::Winget));
        assert_eq!(InstallKind::from_tag("Winget"), None);
        assert_eq!(InstallKind::from_tag("WINGET"), None);
        assert_eq!(InstallKind::from_tag("store"), None);
        assert_eq!(InstallKind::from_tag(""), None);
    }

    #[test]
    fn blank_checksum_means_skip() {
        let mut entry = AppEntry {
            id: "a".into(),
            name: "A".into(),
            ..Default::default()
        };
        assert!(entry.expected_checksum().is_none());

        entry.checksum = "   ".into();
        assert!(entry.expected_checksum().is_none());

        entry.checksum = "ABC123".into();
        assert_eq!(entry.expected_checksum(), Some("ABC123"));
    }

    #[test]
    fn post_steps_accept_capitalised_keys() {
        let json = r#"{"Name": "Create shortcut", "Script": "New-Item -ItemType Directory"}"#;
        let step: PostStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.name, "Create shortcut");
        assert!(step.script.starts_with("New-Item"));

        let json = r#"{"name": "lower", "script": "echo hi"}"#;
        let step: PostStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.name, "lower");
    }
}
