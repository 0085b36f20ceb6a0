//! Page fetching: the only network boundary of the scraping pipeline

use async_trait::async_trait;
use log::trace;
use scrape_widget_core::{Result, SourceError};
use url::Url;

const USER_AGENT: &str = concat!("scrape-widget/", env!("CARGO_PKG_VERSION"));

/// Fetches the body of a web page
///
/// One fetcher is shared by every website element, so implementations must
/// support concurrent use.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// HTTPS fetcher backed by a single shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client that refuses anything but HTTPS
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .https_only(true)
            .user_agent(USER_AGENT)
            .build()
            .map_err(SourceError::fetch)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        trace!("Fetching {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(SourceError::fetch)?;

        response.text().await.map_err(SourceError::fetch)
    }
}
