//! Fetches and parses RSS documents over HTTP.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::domain::rss_document::RssDocument;
use crate::{Error, ErrorKind, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetches feed documents over HTTP, refusing any URL on its blacklist
/// before issuing network I/O.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    blacklist: HashSet<String>,
}

impl Fetcher {
    pub fn new(blacklist: HashSet<String>) -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("reqwest client with a fixed timeout should always build");
        Self { client, blacklist }
    }

    /// Builds a fetcher from the `FETCHER_BLACKLIST` environment variable: a
    /// comma-separated list of URLs the engine will refuse to ever fetch.
    pub fn from_env() -> Self {
        let blacklist = std::env::var("FETCHER_BLACKLIST")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self::new(blacklist)
    }

    /// Fetches `url` and parses it as an RSS 2.0 document.
    pub async fn fetch(&self, url: &str) -> Result<RssDocument> {
        if self.blacklist.contains(url) {
            return Err(Error::new(ErrorKind::BlacklistedUrl, "url is blacklisted"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|_| Error::new(ErrorKind::FetchFailed, "request to feed url failed"))?;

        if response.status() != reqwest::StatusCode::OK {
            debug!(url, status = %response.status(), "feed fetch returned non-200");
            return Err(Error::new(ErrorKind::FetchFailed, "feed url returned a non-200 status"));
        }

        let body = response
            .text()
            .await
            .map_err(|_| Error::new(ErrorKind::FetchFailed, "failed to read feed response body"))?;

        quick_xml::de::from_str(&body)
            .map_err(|_| Error::new(ErrorKind::ParseFailed, "failed to parse feed as rss"))
    }
}
