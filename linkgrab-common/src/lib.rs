//! Common types and utilities shared across linkgrab crates.
//!
//! This crate defines the small set of values that travel between the
//! browser layer, the HTTP layer and the batch orchestrator, plus the
//! observability helpers and the shared error type. It is intentionally
//! lightweight so every crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`SessionCookie`]: a name/value pair lifted out of the browser session
//! - [`AnchorLookup`]: the outcome of looking for the download anchor on a page
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GrabError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use linkgrab_common::SessionCookie;
//!
//! let cookie = SessionCookie::new("sid", "abc123");
//! assert_eq!(cookie.to_string(), "sid=abc123");
//! ```
use std::fmt;
use std::path::PathBuf;

pub mod observability;

/// A cookie copied from the live browser session into the HTTP session.
///
/// Only the name and value survive the hop; domain and path scoping are
/// dropped so the cookie is sent with every download request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// What a page visit found when looking for the trigger anchor.
///
/// Navigation failures and wait failures are reported separately so the
/// orchestrator can log them differently; both skip the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorLookup {
    /// The anchor appeared and carried a usable link target.
    Found { href: String },
    /// The anchor appeared but had no (or an empty) `href`.
    MissingHref,
    /// The anchor did not appear before the wait ran out, or the wait failed.
    Absent { cause: String },
    /// The page could not be loaded at all.
    NavigationFailed { cause: String },
}

/// Error types used across the linkgrab system.
#[derive(thiserror::Error, Debug)]
pub enum GrabError {
    /// The links file could not be opened or read.
    #[error("links file {path} not readable: {source}")]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The browser failed to load a page.
    #[error("navigation to {url} failed: {cause}")]
    Navigation { url: String, cause: String },

    /// The trigger anchor never appeared within the wait window.
    #[error("download button not found: {0}")]
    ButtonNotFound(String),

    /// The trigger anchor was present but carried no usable href.
    #[error("download button has no href")]
    HrefMissing,

    /// The download request failed or returned a non-success status.
    #[error("HTTP failure: {0}")]
    Http(String),

    /// The archive could not be assembled or written to disk.
    #[error("archive write to {path} failed: {cause}")]
    ArchiveWrite { path: PathBuf, cause: String },

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A driver (browser, network, etc.) reported an error.
    #[error("Driver error: {0:#}")]
    Driver(#[from] anyhow::Error),

    /// Strict runs only: some links ended without an archived file.
    #[error("{failed} of {total} links were not archived")]
    LinksFailed { failed: usize, total: usize },
}

/// Convenient alias for results that use [`GrabError`].
pub type Result<T> = std::result::Result<T, GrabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_renders_as_header_pair() {
        assert_eq!(SessionCookie::new("a", "1").to_string(), "a=1");
    }

    #[test]
    fn file_error_mentions_path() {
        let err = GrabError::FileNotReadable {
            path: PathBuf::from("links.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("links.txt"), "{msg}");
        assert!(msg.contains("gone"), "{msg}");
    }

    #[test]
    fn driver_error_keeps_context_chain() {
        let err = GrabError::from(anyhow::anyhow!("connection refused").context("session start"));
        assert_eq!(err.to_string(), "Driver error: session start: connection refused");
    }
}
