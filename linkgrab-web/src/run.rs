//! One full run: read the links file, launch the browser only when there is
//! work, run the batch and apply the exit policy.

use crate::batch::{BatchDownloader, BatchReport};
use crate::browser::PageNavigator;
use crate::fetch::FileFetcher;
use crate::links::LinkSource;
use linkgrab_archive::ArchiveWriter;
use linkgrab_common::{GrabError, Result};
use linkgrab_config::GrabConfig;
use std::future::Future;
use tracing::{info, warn};

/// How a finished batch maps to the process outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Succeed once the archive is written, whatever happened to the links.
    #[default]
    Lenient,
    /// Fail with [`GrabError::LinksFailed`] when any link was not archived.
    Strict,
}

/// Read `config.links_file` and download everything it lists.
///
/// `launch` is called only when there is at least one line to process; an
/// empty or unreadable links file still produces an (empty) archive.
pub async fn run_from_links_file<N, F, L, Fut>(
    config: &GrabConfig,
    fetcher: F,
    launch: L,
    policy: ExitPolicy,
) -> Result<BatchReport>
where
    N: PageNavigator,
    F: FileFetcher,
    L: FnOnce() -> Fut,
    Fut: Future<Output = Result<N>>,
{
    info!("Reading from {}", config.links_file.display());
    let links = LinkSource::new(&config.links_file).read_lines();

    let report = if links.is_empty() {
        info!("No links to process.");
        write_empty_archive(config)?
    } else {
        let navigator = launch().await?;
        BatchDownloader::new(config, navigator, fetcher)
            .run(&links)
            .await?
    };

    let failed = report.failed();
    if failed > 0 {
        warn!("{failed} of {} links were not archived", report.links.len());
        if policy == ExitPolicy::Strict {
            return Err(GrabError::LinksFailed {
                failed,
                total: report.links.len(),
            });
        }
    }
    Ok(report)
}

fn write_empty_archive(config: &GrabConfig) -> Result<BatchReport> {
    let archive_path = config.archive_path();
    let archive_size =
        ArchiveWriter::new()
            .flush(&archive_path)
            .map_err(|e| GrabError::ArchiveWrite {
                path: archive_path.clone(),
                cause: e.to_string(),
            })?;
    info!("All files have been archived to: {}", archive_path.display());
    Ok(BatchReport {
        links: Vec::new(),
        archive_path,
        archive_size,
    })
}
