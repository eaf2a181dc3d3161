//! Streaming download with optional integrity verification

use super::events::EventSender;
use super::http::{FetchError, HttpFetcher};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const CHUNK_SIZE: usize = 8192;
const MEGABYTE: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("{0}")]
    Transport(String),

    #[error("Checksum verification failed! Expected: {expected}, Got: {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FetchError> for DownloadError {
    fn from(err: FetchError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result of a completed download
#[derive(Debug)]
pub struct Downloaded {
    pub path: PathBuf,
    pub bytes: u64,
    /// True only when a digest was computed and matched
    pub verified: bool,
}

/// Stream `url` into `dest_dir/filename`. The digest is computed on the fly
/// and only when a checksum is expected; a mismatch deletes the artifact
/// before returning. Existing files are overwritten.
pub fn download_to(
    fetcher: &dyn HttpFetcher,
    url: &str,
    dest_dir: &Path,
    filename: &str,
    expected_checksum: Option<&str>,
    events: &EventSender,
) -> Result<Downloaded, DownloadError> {
    fs::create_dir_all(dest_dir)?;
    let dest = dest_dir.join(filename);

    let mut body = fetcher.fetch(url)?;
    let total = body.content_length.unwrap_or(0);

    let mut hasher = expected_checksum.map(|_| Sha256::new());
    if let Some(expected) = expected_checksum {
        let preview = &expected[..expected.len().min(16)];
        events.info(format!("Will verify checksum: {}...", preview));
    }

    let mut out = File::create(&dest)?;
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded = 0u64;
    let mut next_report = MEGABYTE;

    loop {
        let n = body
            .reader
            .read(&mut buffer)
            .map_err(|e| DownloadError::Transport(e.to_string()))?;
        if n == 0 {
            break;
        }

        out.write_all(&buffer[..n])?;
        downloaded += n as u64;

        if let Some(ref mut hasher) = hasher {
            hasher.update(&buffer[..n]);
        }

        if total > 0 {
            events.download_progress(downloaded, total);
            if downloaded >= next_report {
                let percent = downloaded as f64 / total as f64 * 100.0;
                events.info(format!(
                    "Downloaded {}MB of {}MB ({:.1}%)",
                    downloaded / MEGABYTE,
                    total / MEGABYTE,
                    percent
                ));
                next_report += MEGABYTE;
            }
        }
    }
    out.flush()?;
    drop(out);

    events.info(format!(
        "Download completed: {} ({} bytes)",
        dest.display(),
        downloaded
    ));

    let mut verified = false;
    if let (Some(expected), Some(hasher)) = (expected_checksum, hasher) {
        let actual = hex::encode(hasher.finalize());
        if actual.eq_ignore_ascii_case(expected) {
            events.success("Checksum verification passed");
            verified = true;
        } else {
            fs::remove_file(&dest).ok();
            return Err(DownloadError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    Ok(Downloaded {
        path: dest,
        bytes: downloaded,
        verified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::events::{InstallerEvent, LogLevel};
    use crate::installer::http::HttpBody;
    use std::io::Cursor;
    use std::sync::mpsc::channel;

    struct OneShotFetcher {
        bytes: Vec<u8>,
    }

    impl HttpFetcher for OneShotFetcher {
        fn fetch(&self, _url: &str) -> Result<HttpBody, FetchError> {
            Ok(HttpBody {
                content_length: Some(self.bytes.len() as u64),
                reader: Box::new(Cursor::new(self.bytes.clone())),
            })
        }
    }

    struct FailingFetcher;

    impl HttpFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<HttpBody, FetchError> {
            Err(FetchError::Http(format!("connection refused: {}", url)))
        }
    }

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    #[test]
    fn writes_file_and_skips_digest_without_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = channel();
        let events = EventSender::new(tx);
        let fetcher = OneShotFetcher {
            bytes: b"payload".to_vec(),
        };

        let downloaded = download_to(
            &fetcher,
            "https://example.com/app.bin",
            dir.path(),
            "app.bin",
            None,
            &events,
        )
        .unwrap();

        assert_eq!(downloaded.bytes, 7);
        assert!(!downloaded.verified);
        assert_eq!(fs::read(downloaded.path).unwrap(), b"payload");

        // No verification announcement when no checksum was supplied
        let announced = rx.try_iter().any(|e| {
            matches!(e, InstallerEvent::Log(l) if l.message.starts_with("Will verify checksum"))
        });
        assert!(!announced);
    }

    #[test]
    fn matching_checksum_is_verified_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = channel();
        let events = EventSender::new(tx);
        let fetcher = OneShotFetcher {
            bytes: b"tool bytes".to_vec(),
        };
        let checksum = sha256_hex(b"tool bytes").to_uppercase();

        let downloaded = download_to(
            &fetcher,
            "https://example.com/tool.exe",
            dir.path(),
            "tool.exe",
            Some(&checksum),
            &events,
        )
        .unwrap();

        assert!(downloaded.verified);
        let passed = rx.try_iter().any(|e| {
            matches!(e, InstallerEvent::Log(l) if l.level == LogLevel::Success
                && l.message.contains("Checksum verification passed"))
        });
        assert!(passed);
    }

    #[test]
    fn mismatch_deletes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = channel();
        let events = EventSender::new(tx);
        let fetcher = OneShotFetcher {
            bytes: b"tampered".to_vec(),
        };
        let wrong = sha256_hex(b"original");

        let err = download_to(
            &fetcher,
            "https://example.com/tool.exe",
            dir.path(),
            "tool.exe",
            Some(&wrong),
            &events,
        )
        .unwrap_err();

        assert!(matches!(err, DownloadError::ChecksumMismatch { .. }));
        assert!(!dir.path().join("tool.exe").exists());
    }

    #[test]
    fn transport_errors_are_reported_not_panicked() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = channel();
        let events = EventSender::new(tx);

        let err = download_to(
            &FailingFetcher,
            "https://example.com/app.zip",
            dir.path(),
            "app.zip",
            None,
            &events,
        )
        .unwrap_err();

        assert!(matches!(err, DownloadError::Transport(_)));
    }

    #[test]
    fn overwrites_leftover_artifact_from_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.bin"), b"stale leftover data").unwrap();

        let (tx, _rx) = channel();
        let events = EventSender::new(tx);
        let fetcher = OneShotFetcher {
            bytes: b"fresh".to_vec(),
        };

        let downloaded = download_to(
            &fetcher,
            "https://example.com/app.bin",
            dir.path(),
            "app.bin",
            None,
            &events,
        )
        .unwrap();

        assert_eq!(fs::read(downloaded.path).unwrap(), b"fresh");
    }
}
