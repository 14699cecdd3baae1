use anyhow::Result;
use fantoccini::{error::CmdError, Client, Locator};
use linkgrab_common::AnchorLookup;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// A loaded page plus the rules for locating its download anchor.
pub struct GrabPage {
    pub(crate) client: Client,
    trigger_text: String,
    wait_timeout: Duration,
}

impl GrabPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, trigger_text: String, wait_timeout: Duration) -> Self {
        Self {
            client,
            trigger_text,
            wait_timeout,
        }
    }

    /// Navigate to `url`.
    pub async fn goto(&mut self, url: &str) -> Result<()> {
        debug!(target: "browser.navigate", %url, "loading page");
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<Url> {
        self.client.current_url().await.map_err(anyhow::Error::from)
    }

    /// Poll for an `<a>` whose text is exactly the trigger phrase, for at
    /// most the configured wait, and read its link target.
    ///
    /// Relative hrefs are resolved against the page URL.
    pub async fn find_trigger_anchor(&self) -> AnchorLookup {
        let xpath = anchor_xpath(&self.trigger_text);

        let element = match self
            .client
            .wait()
            .at_most(self.wait_timeout)
            .for_element(Locator::XPath(&xpath))
            .await
        {
            Ok(element) => element,
            Err(CmdError::WaitTimeout) => {
                return AnchorLookup::Absent {
                    cause: format!(
                        "timed out after {}s waiting for {xpath}",
                        self.wait_timeout.as_secs()
                    ),
                };
            }
            Err(e) => {
                return AnchorLookup::Absent {
                    cause: e.to_string(),
                };
            }
        };

        let raw = match element.attr("href").await {
            Ok(Some(href)) if !href.trim().is_empty() => href,
            Ok(_) => return AnchorLookup::MissingHref,
            Err(e) => {
                return AnchorLookup::Absent {
                    cause: format!("failed to read href: {e}"),
                };
            }
        };

        let href = match self.get_url().await {
            Ok(base) => resolve_href(&base, raw.trim()),
            Err(_) => raw.trim().to_string(),
        };
        debug!(target: "browser.anchor", %href, "trigger anchor found");
        AnchorLookup::Found { href }
    }
}

/// XPath matching anchors whose text node equals `text` exactly.
pub fn anchor_xpath(text: &str) -> String {
    format!("//a[text()={}]", xpath_literal(text))
}

/// Quote `text` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so text holding both quote kinds is
/// split into a `concat(...)` of single-quoted pieces and `"'"`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|piece| format!("'{piece}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn resolve_href(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
