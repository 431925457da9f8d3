//! HTTP transport.
//!
//! [`Fetcher`] is the seam between the engine and the network: given a URL it
//! yields the status code and raw body.  It does not judge the status; the
//! response handler treats anything but 200 as a failed update.  Tests swap in
//! in-memory fetchers.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FeedError;

/// Raw outcome of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one GET.  `Err` means no response was obtained at all.
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FeedError>;
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// [`Fetcher`] backed by a shared async [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(FetchResponse { status, body })
    }
}
