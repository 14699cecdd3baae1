use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive already contains an entry named {0:?}")]
    DuplicateEntry(String),
    #[error("zip error: {0}")]
    Zip(#[from] ZipError),
    #[error("failed to write archive to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Deflate zip assembled in memory and written to disk in one go.
///
/// Nothing touches the filesystem until [`ArchiveWriter::flush`]; if that
/// fails, the accumulated entries are gone.
pub struct ArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
    order: Vec<String>,
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// Append one deflate-compressed entry. Names must be unique.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        if self.names.contains(name) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        self.zip.start_file(name, options)?;
        self.zip.write_all(bytes).map_err(ZipError::Io)?;

        self.names.insert(name.to_string());
        self.order.push(name.to_string());
        debug!(target: "archive.entry", %name, size = bytes.len(), "entry added");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entry names in insertion order.
    pub fn entry_names(&self) -> &[String] {
        &self.order
    }

    /// Finalise the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        Ok(self.zip.finish()?.into_inner())
    }

    /// Finalise and write the archive to `path`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    pub fn flush(self, path: &Path) -> Result<usize, ArchiveError> {
        let entries = self.len();
        let bytes = self.finish()?;
        std::fs::write(path, &bytes).map_err(|source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            target: "archive.flush",
            path = %path.display(),
            entries,
            size = bytes.len(),
            "archive written"
        );
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn read_back(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
        ZipArchive::new(Cursor::new(bytes)).expect("valid zip")
    }

    #[test]
    fn entries_round_trip_deflated() {
        let mut writer = ArchiveWriter::new();
        writer.add("[1]. d-e.rar", &[7u8; 4096]).unwrap();
        writer.add("[3]. unknown_file.bin", b"hello").unwrap();
        assert_eq!(writer.len(), 2);

        let mut archive = read_back(writer.finish().unwrap());
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_name("[1]. d-e.rar").unwrap();
        assert_eq!(first.compression(), CompressionMethod::Deflated);
        let mut content = Vec::new();
        first.read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![7u8; 4096]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut writer = ArchiveWriter::new();
        writer.add("a.bin", b"1").unwrap();
        let err = writer.add("a.bin", b"2").unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateEntry(name) if name == "a.bin"));
        assert_eq!(writer.entry_names(), ["a.bin".to_string()]);
    }

    #[test]
    fn empty_archive_is_still_a_valid_zip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("downloaded_files.zip");

        let written = ArchiveWriter::new().flush(&path).unwrap();
        assert!(written > 0);

        let archive = read_back(std::fs::read(&path).unwrap());
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn flush_overwrites_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.zip");
        std::fs::write(&path, b"stale").unwrap();

        let mut writer = ArchiveWriter::new();
        writer.add("x.exe", b"MZ").unwrap();
        writer.flush(&path).unwrap();

        let archive = read_back(std::fs::read(&path).unwrap());
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn flush_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope").join("out.zip");

        let err = ArchiveWriter::new().flush(&path).unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
        assert!(!path.exists());
    }
}
