//! The batch loop: one link at a time, every failure contained to its link.
//!
//! Per link: navigate, wait for the trigger anchor, read its href, copy the
//! browser cookies, fetch, name the entry, add it to the archive. After the
//! last link the browser is closed once and the archive is written once.

use crate::browser::PageNavigator;
use crate::fetch::FileFetcher;
use linkgrab_archive::{ArchiveWriter, entry_name, extension_for, name_from_url};
use linkgrab_common::{AnchorLookup, GrabError, Result};
use linkgrab_config::GrabConfig;
use std::path::PathBuf;
use tracing::{info, warn};

/// What happened to a single link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    /// The file was added to the archive.
    Success { entry_name: String, size: usize },
    /// The line was blank after trimming; nothing was attempted.
    SkippedBlank,
    /// The trigger anchor never appeared.
    SkippedNoButton { cause: String },
    /// The trigger anchor had no href.
    SkippedNoHref,
    /// Reading cookies or downloading the file failed.
    FetchFailed(String),
    /// The page itself could not be loaded.
    NavigationFailed(String),
    /// The download could not be stored in the archive.
    ArchiveFailed(String),
}

impl DownloadResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadResult::Success { .. })
    }

    /// Anything other than an archived file or an ignored blank line.
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            DownloadResult::Success { .. } | DownloadResult::SkippedBlank
        )
    }
}

#[derive(Debug, Clone)]
pub struct LinkReport {
    /// 1-based position in the input list.
    pub index: usize,
    /// The link as attempted (trimmed).
    pub url: String,
    pub result: DownloadResult,
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    pub links: Vec<LinkReport>,
    pub archive_path: PathBuf,
    pub archive_size: usize,
}

impl BatchReport {
    pub fn archived(&self) -> usize {
        self.links.iter().filter(|l| l.result.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.links.iter().filter(|l| l.result.is_failure()).count()
    }

    /// Entry names written to the archive, in link order.
    pub fn entry_names(&self) -> Vec<&str> {
        self.links
            .iter()
            .filter_map(|l| match &l.result {
                DownloadResult::Success { entry_name, .. } => Some(entry_name.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub struct BatchDownloader<N, F> {
    navigator: N,
    fetcher: F,
    archive: ArchiveWriter,
    archive_path: PathBuf,
}

impl<N: PageNavigator, F: FileFetcher> BatchDownloader<N, F> {
    pub fn new(config: &GrabConfig, navigator: N, fetcher: F) -> Self {
        Self {
            navigator,
            fetcher,
            archive: ArchiveWriter::new(),
            archive_path: config.archive_path(),
        }
    }

    /// Process every link in order, then close the browser and write the
    /// archive. Only the final archive write can fail the batch.
    pub async fn run(mut self, links: &[String]) -> Result<BatchReport> {
        info!(
            "Download process started; files will be archived to {}",
            self.archive_path.display()
        );

        let mut reports = Vec::with_capacity(links.len());
        for (i, raw) in links.iter().enumerate() {
            let index = i + 1;
            let url = raw.trim();
            let result = self.process(index, url).await;
            reports.push(LinkReport {
                index,
                url: url.to_string(),
                result,
            });
        }

        let Self {
            mut navigator,
            archive,
            archive_path,
            ..
        } = self;

        if let Err(e) = navigator.close().await {
            warn!("Failed to close the browser session: {e:#}");
        }

        let archive_size = archive
            .flush(&archive_path)
            .map_err(|e| GrabError::ArchiveWrite {
                path: archive_path.clone(),
                cause: e.to_string(),
            })?;

        info!("Download process finished successfully.");
        info!("All files have been archived to: {}", archive_path.display());

        let report = BatchReport {
            links: reports,
            archive_path,
            archive_size,
        };
        info!(
            links = report.links.len(),
            archived = report.archived(),
            failed = report.failed(),
            "batch summary"
        );
        Ok(report)
    }

    async fn process(&mut self, index: usize, url: &str) -> DownloadResult {
        if url.is_empty() {
            info!("Skipping blank line [{index}]");
            return DownloadResult::SkippedBlank;
        }

        info!("Processing page [{index}]: {url}");

        let href = match self.navigator.open(url).await {
            AnchorLookup::Found { href } => href,
            AnchorLookup::MissingHref => {
                warn!(
                    "{} for URL number [{index}]: {url}. Expected format: <a href='...'>...</a>",
                    GrabError::HrefMissing
                );
                return DownloadResult::SkippedNoHref;
            }
            AnchorLookup::Absent { cause } => {
                let err = GrabError::ButtonNotFound(cause.clone());
                warn!("Error occurred while waiting for the download button at URL [{index}] {url}: {err}");
                return DownloadResult::SkippedNoButton { cause };
            }
            AnchorLookup::NavigationFailed { cause } => {
                let err = GrabError::Navigation {
                    url: url.to_string(),
                    cause,
                };
                warn!("Error occurred trying to download from URL [{index}]: {err}. Download halted.");
                return DownloadResult::NavigationFailed(err.to_string());
            }
        };

        info!("Downloading file from: {href}");

        let cookies = match self.navigator.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                let err = GrabError::Driver(e.context("could not read browser cookies"));
                warn!("Error occurred downloading from URL [{index}] {url}: {err}");
                return DownloadResult::FetchFailed(err.to_string());
            }
        };

        let file = match self.fetcher.fetch(&href, &cookies).await {
            Ok(file) => file,
            Err(e) => {
                let err = GrabError::Http(e.to_string());
                warn!("Error occurred downloading {href} for URL [{index}] {url}: {err}");
                return DownloadResult::FetchFailed(err.to_string());
            }
        };

        let name = entry_name(
            index,
            &name_from_url(url),
            extension_for(&file.content_type),
        );

        match self.archive.add(&name, &file.bytes) {
            Ok(()) => {
                info!("File added to archive as: {name}");
                DownloadResult::Success {
                    entry_name: name,
                    size: file.bytes.len(),
                }
            }
            Err(e) => {
                warn!("Error occurred adding {name} to the archive for URL [{index}] {url}: {e}");
                DownloadResult::ArchiveFailed(e.to_string())
            }
        }
    }
}
