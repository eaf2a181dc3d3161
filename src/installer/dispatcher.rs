//! Multi-strategy installation dispatcher
//!
//! Selects and executes the install strategy for each catalog entry,
//! verifies integrity where a checksum is supplied, runs post-install
//! steps, and reports everything through the event stream. Failures never
//! escape an entry: every error becomes log lines plus a `false`.

use super::archive::{self, ArchiveError};
use super::download::{self, DownloadError};
use super::events::EventSender;
use super::http::HttpFetcher;
use super::process::{CommandRunner, ProcessError};
use crate::catalog::{AppEntry, InstallKind, InstallMethod};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Package-manager invocation ceiling
pub const WINGET_TIMEOUT: Duration = Duration::from_secs(300);

/// Installer-executable ceiling
pub const INSTALLER_TIMEOUT: Duration = Duration::from_secs(600);

/// Per post-step ceiling
pub const POST_STEP_TIMEOUT: Duration = Duration::from_secs(120);

/// How many of the attempted entries succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub total: usize,
}

#[derive(Deserialize)]
struct GitHubRelease {
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// What to do with a downloaded artifact, decided by filename suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallAction {
    RunExe,
    RunMsi,
    Extract,
}

impl InstallAction {
    fn from_filename(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".exe") {
            Some(Self::RunExe)
        } else if lower.ends_with(".msi") {
            Some(Self::RunMsi)
        } else if lower.ends_with(".zip") {
            Some(Self::Extract)
        } else {
            None
        }
    }
}

/// Installation dispatcher
pub struct Installer {
    http: Box<dyn HttpFetcher>,
    runner: Box<dyn CommandRunner>,
    download_dir: PathBuf,
    events: EventSender,
}

impl Installer {
    pub fn new(
        http: Box<dyn HttpFetcher>,
        runner: Box<dyn CommandRunner>,
        download_dir: PathBuf,
        events: EventSender,
    ) -> Self {
        Self {
            http,
            runner,
            download_dir,
            events,
        }
    }

    /// Process entries strictly in the order given. A failed entry never
    /// stops the batch.
    pub fn run_batch(&self, entries: &[AppEntry]) -> BatchSummary {
        let total = entries.len();
        if total == 0 {
            self.events.done(0, 0);
            return BatchSummary {
                completed: 0,
                total: 0,
            };
        }

        self.events.info("Starting installation process...");
        let mut completed = 0usize;

        for entry in entries {
            self.events.info("=".repeat(50));
            self.events.info(format!("Installing: {}", entry.name));
            self.events.info("=".repeat(50));

            self.events.progress(completed as f32 / total as f32);
            self.events.status(format!("Installing {}...", entry.name));

            let success = self.install(entry);

            if success {
                self.events
                    .success(format!("✓ {} installed successfully", entry.name));
                completed += 1;
            } else {
                self.events
                    .error(format!("✗ Failed to install {}", entry.name));
            }

            self.events.app_result(&entry.id, &entry.name, success);
            self.events.progress(completed as f32 / total as f32);
        }

        if completed == total {
            self.events.success(format!(
                "Installation completed! {}/{} applications installed successfully.",
                completed, total
            ));
        } else {
            self.events.warning(format!(
                "Installation completed with errors. {}/{} applications installed.",
                completed, total
            ));
        }
        self.events.done(completed, total);

        BatchSummary { completed, total }
    }

    /// Install a single catalog entry. All observable effects are log
    /// events; the boolean is the only other channel.
    pub fn install(&self, entry: &AppEntry) -> bool {
        let method = entry.primary_method();
        match method.install_kind() {
            Some(InstallKind::Winget) => self.install_winget(&method),
            Some(InstallKind::Github) => self.install_github(entry, &method),
            Some(InstallKind::Exe) | Some(InstallKind::Msi) => {
                self.install_direct(entry, &method)
            }
            Some(InstallKind::Zip) => self.install_zip(entry, &method),
            Some(InstallKind::Web) => {
                self.events.error(format!(
                    "{} is a web-only entry; open {} in a browser and install manually",
                    entry.name,
                    method.url.as_deref().unwrap_or("its homepage")
                ));
                false
            }
            None => {
                self.events
                    .error(format!("Unknown install type: {}", method.kind));
                false
            }
        }
    }

    fn install_winget(&self, method: &InstallMethod) -> bool {
        let Some(winget_id) = non_empty(method.winget_id.as_deref()) else {
            self.events.error("No winget ID specified");
            return false;
        };

        self.events
            .info(format!("Installing via winget: {}", winget_id));

        let args: Vec<String> = [
            "install",
            "--id",
            winget_id,
            "--silent",
            "--accept-package-agreements",
            "--accept-source-agreements",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        match self.runner.run("winget", &args, WINGET_TIMEOUT) {
            Ok(output) if output.success() => {
                self.events.success("Winget installation completed");
                // Package-manager installs are self-contained; no post-steps
                true
            }
            Ok(output) => {
                self.events
                    .error(format!("Winget installation failed: {}", output.stderr));
                false
            }
            Err(ProcessError::Timeout(_, _)) => {
                self.events.error("Winget installation timed out");
                false
            }
            Err(e) => {
                self.events
                    .error(format!("Winget installation error: {}", e));
                false
            }
        }
    }

    fn install_github(&self, entry: &AppEntry, method: &InstallMethod) -> bool {
        let (Some(repo), Some(pattern)) = (
            non_empty(method.github_repo.as_deref()),
            non_empty(method.github_asset.as_deref()),
        ) else {
            self.events.error("Missing GitHub repository or asset name");
            return false;
        };

        self.events
            .info(format!("Downloading from GitHub: {}", repo));

        let api_url = format!("{}/{}/releases/latest", crate::GITHUB_API_ROOT, repo);
        let release: GitHubRelease = match self.fetch_json(&api_url) {
            Ok(release) => release,
            Err(msg) => {
                self.events
                    .error(format!("GitHub download error: {}", msg));
                return false;
            }
        };

        // First asset whose name contains the pattern wins; the order the
        // API lists assets is the tie-break
        let Some(asset) = release.assets.iter().find(|a| a.name.contains(pattern)) else {
            self.events.error(format!(
                "Asset '{}' not found in latest release",
                pattern
            ));
            return false;
        };

        // The pattern doubles as the destination filename when it names a
        // file; otherwise fall back to the asset's real name so the
        // artifact still classifies correctly
        let filename = if InstallAction::from_filename(pattern).is_some() {
            pattern.to_string()
        } else {
            asset.name.clone()
        };

        self.download_and_install(
            entry,
            &asset.browser_download_url,
            &filename,
            method.extract_to.as_deref(),
        )
    }

    fn install_direct(&self, entry: &AppEntry, method: &InstallMethod) -> bool {
        let (Some(url), Some(filename)) = (
            non_empty(method.url.as_deref()),
            non_empty(method.filename.as_deref()),
        ) else {
            self.events.error("Missing download URL or filename");
            return false;
        };

        self.events.info(format!("Downloading: {}", filename));
        self.download_and_install(entry, url, filename, method.extract_to.as_deref())
    }

    fn install_zip(&self, entry: &AppEntry, method: &InstallMethod) -> bool {
        let (Some(url), Some(filename)) = (
            non_empty(method.url.as_deref()),
            non_empty(method.filename.as_deref()),
        ) else {
            self.events.error("Missing download URL or filename");
            return false;
        };

        self.events.info(format!("Downloading zip: {}", filename));

        let downloaded = match download::download_to(
            self.http.as_ref(),
            url,
            &self.download_dir,
            filename,
            entry.expected_checksum(),
            &self.events,
        ) {
            Ok(d) => d,
            Err(DownloadError::ChecksumMismatch { expected, actual }) => {
                self.events.error(format!(
                    "Zip checksum verification failed! Expected: {}, Got: {}",
                    expected, actual
                ));
                return false;
            }
            Err(DownloadError::Transport(msg)) => {
                self.events
                    .error(format!("Network error during zip download: {}", msg));
                return false;
            }
            Err(e) => {
                self.events
                    .error(format!("Zip installation error: {}", e));
                return false;
            }
        };

        if !self.extract_downloaded(&downloaded.path, filename, method.extract_to.as_deref()) {
            return false;
        }

        // Extraction decides the outcome; post-step problems only warn
        self.run_post_steps(entry);
        true
    }

    /// Generic download path shared by the github and exe/msi strategies.
    /// The artifact's filename suffix decides what happens after the
    /// (optionally verified) download.
    fn download_and_install(
        &self,
        entry: &AppEntry,
        url: &str,
        filename: &str,
        extract_to: Option<&str>,
    ) -> bool {
        self.events.info(format!("Downloading from: {}", url));

        let downloaded = match download::download_to(
            self.http.as_ref(),
            url,
            &self.download_dir,
            filename,
            entry.expected_checksum(),
            &self.events,
        ) {
            Ok(d) => d,
            Err(DownloadError::ChecksumMismatch { expected, actual }) => {
                self.events.error(format!(
                    "Checksum verification failed! Expected: {}, Got: {}",
                    expected, actual
                ));
                return false;
            }
            Err(DownloadError::Transport(msg)) => {
                self.events
                    .error(format!("Network error during download: {}", msg));
                return false;
            }
            Err(e) => {
                self.events.error(format!("Download error: {}", e));
                return false;
            }
        };

        match InstallAction::from_filename(filename) {
            Some(InstallAction::RunExe) | Some(InstallAction::RunMsi) => {
                self.run_installer(entry, &downloaded.path)
            }
            Some(InstallAction::Extract) => {
                if !self.extract_downloaded(&downloaded.path, filename, extract_to) {
                    return false;
                }
                self.run_post_steps(entry);
                true
            }
            None => {
                self.events.success("File downloaded successfully");
                self.run_post_steps(entry);
                true
            }
        }
    }

    fn extract_downloaded(
        &self,
        archive_path: &Path,
        filename: &str,
        extract_to: Option<&str>,
    ) -> bool {
        let target_name = match extract_to {
            Some(dir) if !dir.is_empty() => dir.to_string(),
            _ => filename.strip_suffix(".zip").unwrap_or(filename).to_string(),
        };
        let extract_path = self.download_dir.join(&target_name);

        match archive::extract_zip(archive_path, &extract_path) {
            Ok(files) => {
                self.events.info(format!(
                    "Extracted {} files to: {}",
                    files,
                    extract_path.display()
                ));
                true
            }
            Err(ArchiveError::BadArchive(_)) => {
                self.events
                    .error("Downloaded file is not a valid zip archive");
                fs::remove_file(archive_path).ok();
                false
            }
            Err(e) => {
                self.events
                    .error(format!("Zip installation error: {}", e));
                false
            }
        }
    }

    fn run_installer(&self, entry: &AppEntry, file_path: &Path) -> bool {
        let display_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.events
            .info(format!("Running installer: {}", display_name));

        let is_msi = file_path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("msi"))
            .unwrap_or(false);

        let result = if is_msi {
            let args = vec![
                "/i".to_string(),
                file_path.display().to_string(),
                "/quiet".to_string(),
                "/norestart".to_string(),
            ];
            self.runner.run("msiexec", &args, INSTALLER_TIMEOUT)
        } else {
            let args = vec!["/S".to_string()];
            self.runner
                .run(&file_path.display().to_string(), &args, INSTALLER_TIMEOUT)
        };

        match result {
            Ok(output) if output.success() => {
                self.events.success("Installation completed successfully");
                self.run_post_steps(entry);
                true
            }
            Ok(output) => {
                self.events.error(format!(
                    "Installation failed with exit code: {}",
                    output.exit_code
                ));
                if !output.stderr.is_empty() {
                    self.events
                        .error(format!("Installer error output: {}", output.stderr));
                }
                false
            }
            Err(ProcessError::Timeout(_, _)) => {
                self.events.error("Installer timed out");
                false
            }
            Err(e) => {
                self.events.error(format!("Installer error: {}", e));
                false
            }
        }
    }

    /// Run the entry's ordered post-steps. Any per-step failure degrades
    /// to a warning; post-steps can never flip the entry's outcome.
    fn run_post_steps(&self, entry: &AppEntry) {
        if entry.post_steps.is_empty() {
            return;
        }

        self.events.info("Running post-installation steps...");

        for step in &entry.post_steps {
            if step.script.is_empty() {
                continue;
            }
            let step_name = if step.name.is_empty() {
                "Unknown"
            } else {
                step.name.as_str()
            };

            self.events
                .info(format!("Executing step: {}", step_name));

            let args = vec!["-Command".to_string(), step.script.clone()];
            match self.runner.run("powershell", &args, POST_STEP_TIMEOUT) {
                Ok(output) if output.success() => {
                    self.events
                        .success(format!("Step '{}' completed", step_name));
                }
                Ok(output) => {
                    self.events.warning(format!(
                        "Step '{}' failed: {}",
                        step_name, output.stderr
                    ));
                }
                Err(e) => {
                    self.events
                        .warning(format!("Step '{}' failed: {}", step_name, e));
                }
            }
        }
    }

    fn fetch_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        let mut body = self.http.fetch(url).map_err(|e| e.to_string())?;
        let mut buf = String::new();
        body.reader
            .read_to_string(&mut buf)
            .map_err(|e| e.to_string())?;
        serde_json::from_str(&buf).map_err(|e| format!("Failed to parse response: {}", e))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
