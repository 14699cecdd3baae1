//! Download session with browser-like headers, copied cookies and safe logging.
//!
//! - One [`HttpClient`] is reused for the whole batch
//! - Cookies lifted from the browser are replayed as a `Cookie` header; the
//!   configured [`CookieScope`] decides whether they reset between links
//! - Redirects are followed by the client itself, so cookies reach every hop
//!   even when the file lives on another host
//! - Any non-success status is an error; nothing is retried
//! - Optional *raw* request/response logging via `LINKGRAB_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), linkgrab_http::HttpError> {
//! use linkgrab_config::HttpConfig;
//!
//! let mut client = linkgrab_http::HttpClient::new(&HttpConfig::default())?;
//! let file = client.download("https://files.example.com/a.zip", &[]).await?;
//! println!("{} bytes of {}", file.bytes.len(), file.content_type);
//! # Ok(()) }
//! ```
//!
//! Security: cookie and authorization values never reach the logs; raw
//! logging redacts them before printing.

use linkgrab_common::SessionCookie;
use linkgrab_config::{CookieScope, HttpConfig};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode, Url, redirect};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "LINKGRAB_HTTP_RAW";
const MAX_REDIRECTS: usize = 10;
const RAW_MAX_BODY: usize = 4 * 1024; // downloads are binary; keep raw dumps short

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("authorization")
        || name.eq_ignore_ascii_case("cookie")
        || name.eq_ignore_ascii_case("set-cookie")
}

fn loggable_value(name: &str, value: &HeaderValue) -> String {
    if is_secret_header(name) {
        "<redacted>".to_string()
    } else {
        value.to_str().unwrap_or("<binary>").to_string()
    }
}

/// Equivalent curl invocation for reproducing a download by hand.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let header_args = headers.iter().map(|(name, value)| {
        let line = format!("{}: {}", name, loggable_value(name.as_str(), value));
        format!("-H '{}'", line.replace('\'', r"'\''"))
    });

    std::iter::once(format!("curl -X{method}"))
        .chain(header_args)
        .chain(std::iter::once(format!("'{url}'")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.to_string(), loggable_value(name.as_str(), value)))
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned {status}")]
    Status {
        status: StatusCode,
        body_snippet: String,
    },
}

impl HttpError {
    /// HTTP status for server-side failures, `None` for transport errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Response
// ==============================

/// A fully buffered download.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// URL after redirects.
    pub url: Url,
    pub bytes: Vec<u8>,
    /// Raw `Content-Type` header; empty when the server sent none.
    pub content_type: String,
}

// ==============================
// Client
// ==============================

pub struct HttpClient {
    inner: Client,
    cookie_scope: CookieScope,
    cookies: BTreeMap<String, String>,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Build the session from the `http` section of the configuration.
    ///
    /// ```no_run
    /// use linkgrab_config::HttpConfig;
    /// use linkgrab_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new(&HttpConfig::default())?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(120));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(config: &HttpConfig) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        headers.insert(USER_AGENT, ua);

        let inner = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            inner,
            cookie_scope: config.cookie_scope,
            cookies: BTreeMap::new(),
            default_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Copy browser cookies into the session.
    ///
    /// With [`CookieScope::PerLink`] the previous link's cookies are dropped
    /// first; with [`CookieScope::Shared`] they accumulate and same-named
    /// cookies are overwritten.
    pub fn set_cookies(&mut self, cookies: &[SessionCookie]) {
        if self.cookie_scope == CookieScope::PerLink {
            self.cookies.clear();
        }
        for cookie in cookies {
            self.cookies.insert(cookie.name.clone(), cookie.value.clone());
        }
    }

    /// The `Cookie` header value the next request will carry.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Copy `cookies` into the session, then GET `url`.
    pub async fn download(
        &mut self,
        url: &str,
        cookies: &[SessionCookie],
    ) -> Result<DownloadedFile, HttpError> {
        self.set_cookies(cookies);
        self.get_bytes(url).await
    }

    /// GET `url` with the session's cookies and return the body.
    ///
    /// Redirects are followed here rather than by reqwest so that every hop,
    /// including ones to another host, carries the session cookies.
    // FIXME(memory): bodies are fully buffered because the archive needs the
    // whole entry anyway; large files could stream into the zip writer instead.
    pub async fn get_bytes(&self, url: &str) -> Result<DownloadedFile, HttpError> {
        let mut url = Url::parse(url).map_err(|e| HttpError::Url(format!("{url}: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(cookie) = self.cookie_header() {
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| HttpError::Build(format!("invalid cookie header: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let req_id = format!(
            "r{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );

        let mut hops = 0;
        loop {
            let resp = self.send_once(&req_id, &url, &headers).await?;
            let status = resp.status();

            if status.is_redirection() {
                let Some(next) = redirect_target(&url, resp.headers()) else {
                    return self.finish(&req_id, url, resp).await;
                };
                if hops == MAX_REDIRECTS {
                    tracing::warn!(req_id=%req_id, %status, hops, "http.redirect.limit");
                    return Err(HttpError::Network(format!(
                        "too many redirects (more than {MAX_REDIRECTS}), last hop {url}"
                    )));
                }
                hops += 1;
                tracing::debug!(req_id=%req_id, %status, from=%url, to=%next, hops, "http.redirect");
                url = next;
                continue;
            }

            return self.finish(&req_id, url, resp).await;
        }
    }

    async fn send_once(
        &self,
        req_id: &str,
        url: &Url,
        headers: &HeaderMap,
    ) -> Result<Response, HttpError> {
        tracing::debug!(
            req_id=%req_id,
            method=%Method::GET,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=self.default_timeout.as_millis() as u64,
            cookies=self.cookies.len(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&Method::GET, url, headers);
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        self.inner
            .get(url.clone())
            .headers(headers.clone())
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(req_id=%req_id, error=%err, "http.network_error.send");
                HttpError::Network(err.to_string())
            })
    }

    /// Read the final response body and turn non-2xx into [`HttpError::Status`].
    async fn finish(
        &self,
        req_id: &str,
        url: Url,
        resp: Response,
    ) -> Result<DownloadedFile, HttpError> {
        let t0 = std::time::Instant::now();
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, error=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let content_type = resp_headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            body_ms=dur_ms,
            body_len=bytes.len(),
            content_type=%content_type,
            final_url=%url,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&resp_headers);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                body_ms=dur_ms,
                headers=?hdrs,
                body=%snip_body(&bytes, RAW_MAX_BODY),
                truncated=bytes.len() > RAW_MAX_BODY
            );
        }

        if status.is_success() {
            return Ok(DownloadedFile {
                url,
                bytes: bytes.to_vec(),
                content_type,
            });
        }

        let body_snippet = snip_body(&bytes, 500);
        tracing::warn!(
            req_id=%req_id,
            %status,
            body_snippet=%body_snippet,
            "http.error"
        );
        Err(HttpError::Status {
            status,
            body_snippet,
        })
    }
}

// ==============================
// Helpers
// ==============================

/// `Location` of a redirect, resolved against the URL that produced it.
fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

fn snip_body(body: &[u8], max: usize) -> String {
    let cut = body.len().min(max);
    let mut snip = String::from_utf8_lossy(&body[..cut]).to_string();
    if body.len() > max {
        snip.push_str("...");
    }
    snip
}
