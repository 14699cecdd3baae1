use crate::grab_browser::{capabilities::build_capabilities, page::GrabPage};
use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder};
use linkgrab_common::SessionCookie;
use linkgrab_config::BrowserConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver serves the whole batch: every page is loaded into the same
/// session, so cookies set by earlier pages stay visible to later ones.
pub struct GrabDriver {
    pub client: Client,
    wait_timeout: Duration,
    trigger_text: String,
}

impl GrabDriver {
    /// Open a new browser session on the configured WebDriver endpoint
    /// (geckodriver for Firefox, chromedriver for Chrome).
    pub async fn new(config: &BrowserConfig) -> Result<Self> {
        let caps = build_capabilities(config.kind, config.headless);

        info!(
            target: "browser.session",
            webdriver_url = %config.webdriver_url,
            kind = ?config.kind,
            headless = config.headless,
            "starting browser session"
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .with_context(|| {
                format!(
                    "failed to start a {:?} session at {}",
                    config.kind, config.webdriver_url
                )
            })?;

        Ok(Self {
            client,
            wait_timeout: config.wait_timeout(),
            trigger_text: config.trigger_text.clone(),
        })
    }

    /// Navigate to `url` and return a [`GrabPage`] bound to the configured
    /// trigger text and wait window.
    pub async fn goto(&self, url: &str) -> Result<GrabPage> {
        let mut page = GrabPage::new(
            self.client.clone(),
            self.trigger_text.clone(),
            self.wait_timeout,
        );
        page.goto(url).await?;
        Ok(page)
    }

    /// Snapshot every cookie visible to the current browsing context.
    pub async fn cookies(&self) -> Result<Vec<SessionCookie>> {
        let cookies = self
            .client
            .get_all_cookies()
            .await
            .context("failed to read browser cookies")?;

        debug!(target: "browser.cookies", count = cookies.len(), "read session cookies");

        Ok(cookies
            .iter()
            .map(|c| SessionCookie::new(c.name(), c.value()))
            .collect())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
