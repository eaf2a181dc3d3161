//! Zip archive extraction

use std::fs::{self, File};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Not a valid zip archive: {0}")]
    BadArchive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract every entry of `archive_path` into `target_dir`, creating it if
/// absent. Existing files are overwritten. Returns the number of files
/// written.
pub fn extract_zip(archive_path: &Path, target_dir: &Path) -> Result<usize, ArchiveError> {
    let file = File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ArchiveError::BadArchive(e.to_string()))?;

    fs::create_dir_all(target_dir)?;
    let mut written = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ArchiveError::BadArchive(e.to_string()))?;

        // enclosed_name rejects entries that would escape the target dir
        let outpath = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => continue,
        };

        if entry.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut entry, &mut outfile)?;
            written += 1;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            for (name, content) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn extracts_nested_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("tool.zip");
        fs::write(
            &archive_path,
            zip_bytes(&[("tool.exe", "binary"), ("docs/readme.txt", "hello")]),
        )
        .unwrap();

        let target = dir.path().join("tool");
        let written = extract_zip(&archive_path, &target).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(target.join("tool.exe")).unwrap(), "binary");
        assert_eq!(
            fs::read_to_string(target.join("docs/readme.txt")).unwrap(),
            "hello"
        );
    }

    #[test]
    fn second_extraction_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");

        let first = dir.path().join("a.zip");
        fs::write(&first, zip_bytes(&[("config.ini", "version=1")])).unwrap();
        extract_zip(&first, &target).unwrap();

        let second = dir.path().join("b.zip");
        fs::write(&second, zip_bytes(&[("config.ini", "version=2")])).unwrap();
        extract_zip(&second, &target).unwrap();

        assert_eq!(
            fs::read_to_string(target.join("config.ini")).unwrap(),
            "version=2"
        );
    }

    #[test]
    fn garbage_is_a_bad_archive_not_io() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("broken.zip");
        fs::write(&archive_path, b"this is not a zip file at all").unwrap();

        let err = extract_zip(&archive_path, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, ArchiveError::BadArchive(_)));
    }

    #[test]
    fn missing_archive_is_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_zip(&dir.path().join("absent.zip"), dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::Io(_)));
    }
}
