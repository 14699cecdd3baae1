use anyhow::{Result, anyhow};
use linkgrab_common::{AnchorLookup, GrabError, SessionCookie};
use linkgrab_config::BrowserConfig;
use linkgrab_drivers::grab_browser::driver::GrabDriver;
use url::Url;

/// Loads pages and reports whether the trigger anchor showed up.
#[async_trait::async_trait]
pub trait PageNavigator: Send {
    /// Load `url`, then wait (bounded) for the trigger anchor.
    async fn open(&mut self, url: &str) -> AnchorLookup;

    /// Cookies currently held by the browser session.
    async fn cookies(&mut self) -> Result<Vec<SessionCookie>>;

    /// End the browser session. Later calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}

/// Concrete navigator backed by the fantoccini-based driver.
pub struct FantocciniNavigator {
    driver: Option<GrabDriver>,
}

impl FantocciniNavigator {
    /// Start the browser session. Failure here is fatal for the batch.
    pub async fn launch(config: &BrowserConfig) -> linkgrab_common::Result<Self> {
        let driver = GrabDriver::new(config).await.map_err(GrabError::Driver)?;
        Ok(Self {
            driver: Some(driver),
        })
    }
}

#[async_trait::async_trait]
impl PageNavigator for FantocciniNavigator {
    async fn open(&mut self, url: &str) -> AnchorLookup {
        let Some(driver) = self.driver.as_ref() else {
            return AnchorLookup::NavigationFailed {
                cause: "browser session already closed".to_string(),
            };
        };
        if let Err(cause) = check_page_url(url) {
            return AnchorLookup::NavigationFailed { cause };
        }
        match driver.goto(url).await {
            Ok(page) => page.find_trigger_anchor().await,
            Err(e) => AnchorLookup::NavigationFailed {
                cause: format!("{e:#}"),
            },
        }
    }

    async fn cookies(&mut self) -> Result<Vec<SessionCookie>> {
        match self.driver.as_ref() {
            Some(driver) => driver.cookies().await,
            None => Err(anyhow!("browser session already closed")),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(driver) => driver.close().await,
            None => Ok(()),
        }
    }
}

/// WebDriver resolves scheme-less input against the page already loaded, so
/// anything that is not an absolute URL is refused before navigating.
fn check_page_url(url: &str) -> std::result::Result<(), String> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|e| format!("invalid page URL {url:?}: {e}"))
}
