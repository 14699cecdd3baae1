//! Page visiting, downloading and the batch loop that ties them together.
//!
//! - Link list reader (`links`)
//! - Browser navigation trait and Fantoccini-backed implementation (`browser`)
//! - Download trait implemented by the reqwest session (`fetch`)
//! - Batch orchestration and per-link outcomes (`batch`)
//! - A whole run from the links file to the exit policy (`run`)

pub mod batch;
pub mod browser;
pub mod fetch;
pub mod links;
pub mod run;

pub use batch::{BatchDownloader, BatchReport, DownloadResult, LinkReport};
pub use browser::{FantocciniNavigator, PageNavigator};
pub use fetch::FileFetcher;
pub use links::LinkSource;
pub use run::{ExitPolicy, run_from_links_file};
