use linkgrab_common::{GrabError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::error;

/// The text file listing page URLs, one per line.
#[derive(Debug, Clone)]
pub struct LinkSource {
    path: PathBuf,
}

impl LinkSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every line of the file, untrimmed, in file order.
    pub fn try_read_lines(&self) -> Result<Vec<String>> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|source| GrabError::FileNotReadable {
                path: self.path.clone(),
                source,
            })?;
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Like [`LinkSource::try_read_lines`], but a missing or unreadable file
    /// is reported and treated as an empty list.
    pub fn read_lines(&self) -> Vec<String> {
        match self.try_read_lines() {
            Ok(lines) => lines,
            Err(GrabError::FileNotReadable { path, source }) if source.kind() == ErrorKind::NotFound => {
                error!(
                    "File at {} not found! Check spelling, path or if you are in the working directory.",
                    path.display()
                );
                Vec::new()
            }
            Err(e) => {
                error!("Error occurred: {e}");
                Vec::new()
            }
        }
    }
}
