//! Error types.
//!
//! Every failure the engine sees is feed-local: a [`FeedError`] abandons one
//! feed's update for one poll and nothing else.  [`ConfigError`] only covers
//! the configuration *file*; malformed entries inside it are dropped by the
//! registry instead of failing the load.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single feed's update was abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The server answered with anything other than 200 OK.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The request never produced a usable response (DNS, connect, timeout,
    /// truncated body, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was fetched but is not a feed document.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Transport(err.to_string())
    }
}

impl From<rss::Error> for FeedError {
    fn from(err: rss::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}

/// The configuration file itself could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
