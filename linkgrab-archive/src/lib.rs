//! Archive assembly for downloaded files.
//!
//! - [`naming`]: entry names derived from the page URL and the response content type
//! - [`writer`]: in-memory deflate zip, committed to disk once per batch

pub mod naming;
pub mod writer;

pub use naming::{entry_name, extension_for, name_from_url};
pub use writer::{ArchiveError, ArchiveWriter};
