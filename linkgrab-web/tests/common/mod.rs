#![allow(dead_code)]

use anyhow::{Result, anyhow};
use linkgrab_common::{AnchorLookup, SessionCookie};
use linkgrab_config::{BrowserConfig, DEFAULT_ARCHIVE_NAME, GrabConfig, HttpConfig};
use linkgrab_http::{DownloadedFile, HttpError};
use linkgrab_web::{FileFetcher, PageNavigator};
use reqwest::{StatusCode, Url};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub fn config_for(save_dir: &Path) -> GrabConfig {
    GrabConfig {
        links_file: save_dir.join("links.txt"),
        save_dir: save_dir.to_path_buf(),
        archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        browser: BrowserConfig::default(),
        http: HttpConfig::default(),
    }
}

pub fn lines(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

/// Shared view of what a fake navigator was asked to do.
#[derive(Default, Clone)]
pub struct NavLog {
    pub visited: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<Mutex<usize>>,
}

impl NavLog {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        *self.closes.lock().unwrap()
    }
}

/// Navigator serving canned lookups; unknown pages have no anchor.
pub struct FakeNavigator {
    pages: HashMap<String, AnchorLookup>,
    cookies: Option<Vec<SessionCookie>>,
    log: NavLog,
}

impl FakeNavigator {
    pub fn new(log: &NavLog) -> Self {
        Self {
            pages: HashMap::new(),
            cookies: Some(vec![SessionCookie::new("sid", "abc")]),
            log: log.clone(),
        }
    }

    pub fn page(mut self, url: &str, lookup: AnchorLookup) -> Self {
        self.pages.insert(url.to_string(), lookup);
        self
    }

    pub fn anchor(self, url: &str, href: &str) -> Self {
        self.page(
            url,
            AnchorLookup::Found {
                href: href.to_string(),
            },
        )
    }

    pub fn cookies(mut self, cookies: Vec<SessionCookie>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn broken_cookies(mut self) -> Self {
        self.cookies = None;
        self
    }
}

#[async_trait::async_trait]
impl PageNavigator for FakeNavigator {
    async fn open(&mut self, url: &str) -> AnchorLookup {
        self.log.visited.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| AnchorLookup::Absent {
                cause: "timed out after 10s".to_string(),
            })
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>> {
        self.cookies
            .clone()
            .ok_or_else(|| anyhow!("no such window"))
    }

    async fn close(&mut self) -> Result<()> {
        *self.log.closes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Fetcher serving canned responses; unknown hrefs are 404s.
#[derive(Default)]
pub struct FakeFetcher {
    files: HashMap<String, (Vec<u8>, String)>,
    pub requests: Arc<Mutex<Vec<(String, Vec<SessionCookie>)>>>,
}

impl FakeFetcher {
    pub fn file(mut self, href: &str, bytes: &[u8], content_type: &str) -> Self {
        self.files
            .insert(href.to_string(), (bytes.to_vec(), content_type.to_string()));
        self
    }
}

#[async_trait::async_trait]
impl FileFetcher for FakeFetcher {
    async fn fetch(
        &mut self,
        href: &str,
        cookies: &[SessionCookie],
    ) -> Result<DownloadedFile, HttpError> {
        self.requests
            .lock()
            .unwrap()
            .push((href.to_string(), cookies.to_vec()));
        match self.files.get(href) {
            Some((bytes, content_type)) => Ok(DownloadedFile {
                url: Url::parse(href).map_err(|e| HttpError::Url(e.to_string()))?,
                bytes: bytes.clone(),
                content_type: content_type.clone(),
            }),
            None => Err(HttpError::Status {
                status: StatusCode::NOT_FOUND,
                body_snippet: String::new(),
            }),
        }
    }
}

/// (name, content) pairs of every entry in the archive at `path`.
pub fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
    let bytes = std::fs::read(path).expect("archive exists");
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).expect("entry");
        let mut content = Vec::new();
        entry.read_to_end(&mut content).expect("entry readable");
        out.push((entry.name().to_string(), content));
    }
    out
}
