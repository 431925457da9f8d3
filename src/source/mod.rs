//! Feed sources and the document-parser abstraction.
//!
//! This module defines [`FeedSource`] (where to fetch from), the common
//! [`FeedItem`] type, and the [`FeedParser`] trait that turns a fetched body
//! into items.  Concrete parsers live in sub-modules (currently only
//! [`rss`]).
//!
//! ## For contributors — adding a new document format
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomParser`) and implement [`FeedParser`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Hand an instance to `IngestionEngine::new` in `main.rs`.
//!
//! That's it — dispatch, de-duplication, and the UI are all format-agnostic.

mod feed_item;
mod rss;

// Re-export the public API of this module so callers can write
// `use feedwatch::source::{FeedItem, FeedParser, RssParser};`
pub use self::rss::RssParser;
pub use feed_item::FeedItem;

use crate::error::FeedError;

/// A configured feed: a stable identifier plus the URL to poll.
///
/// Build these with [`FeedSource::new`].  The fields stay public for
/// reading; the dispatcher skips any value that fails [`is_valid`](Self::is_valid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub id: String,
    pub url: String,
}

impl FeedSource {
    /// Build a source, or `None` when either field is missing or blank.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let url = url.into();
        if id.trim().is_empty() || url.trim().is_empty() {
            return None;
        }
        Some(Self { id, url })
    }

    /// Both `id` and `url` are non-blank.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// The outcome of parsing one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Items in document order.
    pub items: Vec<FeedItem>,
    /// Entries skipped because no identifier could be extracted.
    pub rejected: usize,
}

/// Trait that every document parser must implement.
///
/// The engine calls [`parse()`](FeedParser::parse) on the fetch task, off the
/// ingestion context, so implementations must be [`Send`] + [`Sync`] and must
/// not touch shared state.
///
/// ## Implementing a new parser
///
/// ```ignore
/// pub struct MyParser;
///
/// impl FeedParser for MyParser {
///     fn parse(&self, body: &[u8]) -> Result<ParsedFeed, FeedError> {
///         // Decode `body`, then convert entries into FeedItem values.
///         todo!()
///     }
/// }
/// ```
pub trait FeedParser: Send + Sync {
    /// Parse a raw response body.
    ///
    /// A malformed document is an `Err(FeedError::Parse)`; the engine then
    /// drops the whole feed update, so implementations must not return
    /// partially-parsed garbage as `Ok`.
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_source_requires_both_fields() {
        assert!(FeedSource::new("1", "http://example.com/feed").is_some());
        assert!(FeedSource::new("", "http://example.com/feed").is_none());
        assert!(FeedSource::new("1", "").is_none());
        assert!(FeedSource::new("  ", "http://example.com/feed").is_none());
    }

    #[test]
    fn literal_with_blank_field_is_not_valid() {
        let source = FeedSource {
            id: String::new(),
            url: "http://example.com/feed".into(),
        };
        assert!(!source.is_valid());
        assert!(FeedSource::new("1", "http://example.com/feed").is_some_and(|s| s.is_valid()));
    }
}
