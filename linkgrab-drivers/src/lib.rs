//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session and the page helpers the batch
//! downloader uses to find a download anchor and lift the session cookies.
//!
//! - [`grab_browser::driver::GrabDriver`]: WebDriver client wrapper
//! - [`grab_browser::page::GrabPage`]: trigger-anchor lookup on a loaded page
//! - [`grab_browser::capabilities`]: per-browser session capabilities
pub mod grab_browser;
