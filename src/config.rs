//! Feed configuration and the feed registry.
//!
//! The configuration file is JSON:
//!
//! ```json
//! {
//!   "rss": [
//!     { "id": "bbc", "url": "https://feeds.bbci.co.uk/news/rss.xml" },
//!     { "id": "lwn", "url": "https://lwn.net/headlines/rss" }
//!   ],
//!   "poll_interval_secs": 60
//! }
//! ```
//!
//! Entries are decoded leniently (both fields optional, wrong types read as
//! missing) and filtered by [`Config::valid_sources`]: an entry missing its
//! `id` or `url` is dropped without an error.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::source::FeedSource;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// One entry of the `rss` array.
///
/// Any JSON value decodes: a field that is absent or not a string reads as
/// `None`, and an entry that is not an object has neither field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub url: Option<String>,
}

impl<'de> Deserialize<'de> for FeedEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_owned);
        Ok(Self {
            id: field("id"),
            url: field("url"),
        })
    }
}

impl FeedEntry {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rss: Vec<FeedEntry>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rss: Vec::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The feed registry: configured entries that carry both an `id` and a
    /// `url`, in file order.
    pub fn valid_sources(&self) -> Vec<FeedSource> {
        self.rss
            .iter()
            .filter_map(|entry| {
                let source = FeedSource::new(
                    entry.id.clone().unwrap_or_default(),
                    entry.url.clone().unwrap_or_default(),
                );
                if source.is_none() {
                    debug!(?entry, "skipping feed entry without id or url");
                }
                source
            })
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the poller.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
