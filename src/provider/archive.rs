//! Zip extraction with protections against zip slip and zip bomb archives.

use crate::error::{ReleaseTrainError, Result};
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};

/// Maximum uncompressed size for any single zip entry (100 MB)
pub const MAX_UNCOMPRESSED_SIZE: u64 = 100 * 1024 * 1024;
/// Maximum compression ratio to detect zip bombs (normal files rarely exceed 20:1)
pub const MAX_COMPRESSION_RATIO: f64 = 100.0;
/// Maximum total extracted size for all entries combined (500 MB)
pub const MAX_TOTAL_EXTRACTED_SIZE: u64 = 500 * 1024 * 1024;

/// A reader wrapper that limits the number of bytes that can be read.
/// Catches entries that lie about their uncompressed size in headers.
struct LimitedReader<R> {
    inner: R,
    remaining: u64,
}

impl<R> LimitedReader<R> {
    fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            // an entry of exactly the limit is fine; only report data past it
            let mut extra = [0u8; 1];
            return match self.inner.read(&mut extra)? {
                0 => Ok(0),
                _ => Err(io::Error::other(
                    "Zip entry exceeds maximum allowed size during extraction",
                )),
            };
        }

        let max_read = std::cmp::min(buf.len() as u64, self.remaining) as usize;
        let bytes_read = self.inner.read(&mut buf[..max_read])?;
        self.remaining = self.remaining.saturating_sub(bytes_read as u64);

        Ok(bytes_read)
    }
}

fn archive_error(msg: impl Into<String>) -> ReleaseTrainError {
    ReleaseTrainError::provider(format!("Archive rejected: {}", msg.into()))
}

/// Checks an entry's declared sizes against the absolute and ratio limits
fn validate_entry_size(name: &str, compressed: u64, uncompressed: u64) -> Result<()> {
    if uncompressed > MAX_UNCOMPRESSED_SIZE {
        return Err(archive_error(format!(
            "entry '{}' too large: {} bytes (max: {} bytes)",
            name, uncompressed, MAX_UNCOMPRESSED_SIZE
        )));
    }

    if compressed > 0 {
        let ratio = uncompressed as f64 / compressed as f64;
        if ratio > MAX_COMPRESSION_RATIO {
            return Err(archive_error(format!(
                "suspicious compression ratio in '{}': {:.1}x (max: {:.1}x)",
                name, ratio, MAX_COMPRESSION_RATIO
            )));
        }
    }

    Ok(())
}

/// Resolves an entry name below `dest_dir`, rejecting anything that would escape it.
pub fn safe_extract_path(dest_dir: &Path, entry_name: &str) -> Result<PathBuf> {
    if entry_name.contains("..") {
        return Err(archive_error(format!(
            "path contains '..' component - '{}'",
            entry_name
        )));
    }

    if entry_name.starts_with('/') || entry_name.starts_with('\\') {
        return Err(archive_error(format!(
            "path starts with a separator - '{}'",
            entry_name
        )));
    }

    let entry_path = Path::new(entry_name);
    if entry_path.is_absolute() {
        return Err(archive_error(format!("absolute path - '{}'", entry_name)));
    }

    let mut normalized = dest_dir.to_path_buf();
    for component in entry_path.components() {
        match component {
            Component::Normal(c) => normalized.push(c),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(archive_error(format!(
                    "path escapes destination - '{}'",
                    entry_name
                )));
            }
        }
    }

    if !normalized.starts_with(dest_dir) {
        return Err(archive_error(format!(
            "resolved path '{}' escapes destination '{}'",
            normalized.display(),
            dest_dir.display()
        )));
    }

    Ok(normalized)
}

fn zip_error(e: zip::result::ZipError) -> ReleaseTrainError {
    archive_error(format!("invalid zip archive: {}", e))
}

/// Extracts a zip archive held in memory into `dest_dir`.
///
/// Every entry is validated before anything is written, so a rejected archive
/// leaves the destination untouched.
pub fn extract_zip(bytes: &[u8], dest_dir: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(zip_error)?;

    let mut total_uncompressed_size: u64 = 0;
    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index(i).map_err(zip_error)?;
        let name = file.name().to_string();

        validate_entry_size(&name, file.compressed_size(), file.size())?;

        total_uncompressed_size = total_uncompressed_size
            .checked_add(file.size())
            .ok_or_else(|| archive_error("total uncompressed size overflow"))?;
        if total_uncompressed_size > MAX_TOTAL_EXTRACTED_SIZE {
            return Err(archive_error(format!(
                "total uncompressed size {} exceeds maximum {} bytes",
                total_uncompressed_size, MAX_TOTAL_EXTRACTED_SIZE
            )));
        }

        if name.is_empty() {
            entries.push(None);
            continue;
        }
        let outpath = safe_extract_path(dest_dir, &name)?;
        entries.push(Some((outpath, file.is_dir())));
    }

    fs::create_dir_all(dest_dir)?;

    for (i, entry) in entries.into_iter().enumerate() {
        let Some((outpath, is_dir)) = entry else {
            continue;
        };

        if is_dir {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = archive.by_index(i).map_err(zip_error)?;
        let mut outfile = File::create(&outpath)?;
        let mut limited = LimitedReader::new(&mut file, MAX_UNCOMPRESSED_SIZE);
        io::copy(&mut limited, &mut outfile)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            match content {
                Some(content) => {
                    writer
                        .start_file(*name, SimpleFileOptions::default())
                        .unwrap();
                    writer.write_all(content.as_bytes()).unwrap();
                }
                None => writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap(),
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_nested_archive() {
        let bytes = build_zip(&[
            ("acme-widgets-abc123/", None),
            ("acme-widgets-abc123/README.md", Some("# widgets")),
            ("acme-widgets-abc123/src/lib.rs", Some("pub fn widget() {}")),
        ]);
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("release-1.4.0");

        extract_zip(&bytes, &dest).unwrap();

        let readme = fs::read_to_string(dest.join("acme-widgets-abc123/README.md")).unwrap();
        assert_eq!(readme, "# widgets");
        assert!(dest.join("acme-widgets-abc123/src/lib.rs").is_file());
    }

    #[test]
    fn test_reject_invalid_bytes() {
        let temp = TempDir::new().unwrap();
        let err = extract_zip(b"not a zip", temp.path()).unwrap_err();
        assert!(err.to_string().contains("Archive rejected"));
    }

    #[test]
    fn test_safe_extract_path_rejects_traversal() {
        let dest = Path::new("/tmp/builds/release-1.4.0");
        assert!(safe_extract_path(dest, "../escape.txt").is_err());
        assert!(safe_extract_path(dest, "a/../../escape.txt").is_err());
        assert!(safe_extract_path(dest, "/etc/passwd").is_err());
        assert!(safe_extract_path(dest, "\\windows").is_err());
    }

    #[test]
    fn test_safe_extract_path_accepts_nested() {
        let dest = Path::new("/tmp/builds/release-1.4.0");
        assert_eq!(
            safe_extract_path(dest, "./repo/src/main.rs").unwrap(),
            dest.join("repo/src/main.rs")
        );
    }

    #[test]
    fn test_validate_entry_size_limits() {
        assert!(validate_entry_size("ok", 10, 100).is_ok());
        assert!(validate_entry_size("bomb", 10, 10_000).is_err());
        assert!(validate_entry_size("huge", MAX_UNCOMPRESSED_SIZE, MAX_UNCOMPRESSED_SIZE + 1).is_err());
    }

    #[test]
    fn test_limited_reader_stops_at_limit() {
        let data = vec![7u8; 64];
        let mut reader = LimitedReader::new(&data[..], 16);
        let mut buf = [0u8; 64];
        assert_eq!(reader.read(&mut buf).unwrap(), 16);
        assert!(reader.read(&mut buf).is_err());
    }

    #[test]
    fn test_limited_reader_allows_exact_limit() {
        let data = vec![7u8; 16];
        let mut reader = LimitedReader::new(&data[..], 16);
        let mut out = Vec::new();
        assert_eq!(io::copy(&mut reader, &mut out).unwrap(), 16);
        assert_eq!(out, data);
    }
}
