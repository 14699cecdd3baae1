use linkgrab_common::SessionCookie;
use linkgrab_http::{DownloadedFile, HttpClient, HttpError};

/// Downloads a resolved href using cookies taken from the browser.
#[async_trait::async_trait]
pub trait FileFetcher: Send {
    async fn fetch(
        &mut self,
        href: &str,
        cookies: &[SessionCookie],
    ) -> Result<DownloadedFile, HttpError>;
}

#[async_trait::async_trait]
impl FileFetcher for HttpClient {
    async fn fetch(
        &mut self,
        href: &str,
        cookies: &[SessionCookie],
    ) -> Result<DownloadedFile, HttpError> {
        self.download(href, cookies).await
    }
}
