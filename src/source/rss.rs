//! RSS document parser.
//!
//! This module shows how to implement the [`FeedParser`] trait for a concrete
//! document format.  Use it as a template when adding support for Atom, JSON
//! Feed, or any other format.
//!
//! ## Item identity
//!
//! The engine de-duplicates on `guid`, so every item needs an identifier that
//! stays the same across polls.  We take `<guid>` when present, fall back to
//! `<link>`, and reject the item when neither exists.  Rejected items are
//! counted in [`ParsedFeed::rejected`] so the caller can report them.

use tracing::debug;

use super::{FeedItem, FeedParser, ParsedFeed};
use crate::error::FeedError;

/// Parses RSS 2.0 documents using the [`rss`] crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssParser;

impl RssParser {
    pub fn new() -> Self {
        Self
    }

    /// Convert an already-decoded [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// extraction rules without building byte buffers.
    pub fn parse_channel(channel: &rss::Channel) -> ParsedFeed {
        let mut parsed = ParsedFeed::default();

        for item in channel.items() {
            // Prefer <guid>, fall back to <link>, otherwise reject.
            let guid = item
                .guid()
                .map(|g| g.value().trim())
                .filter(|g| !g.is_empty())
                .or_else(|| item.link().map(str::trim).filter(|l| !l.is_empty()));

            let Some(guid) = guid else {
                debug!(title = item.title().unwrap_or_default(), "rejecting item without guid or link");
                parsed.rejected += 1;
                continue;
            };

            parsed.items.push(FeedItem {
                guid: guid.to_string(),
                title: item.title().unwrap_or("(untitled)").to_string(),
                link: item.link().unwrap_or_default().to_string(),
            });
        }

        parsed
    }
}

impl FeedParser for RssParser {
    fn parse(&self, body: &[u8]) -> Result<ParsedFeed, FeedError> {
        let channel = rss::Channel::read_from(body)?;
        Ok(Self::parse_channel(&channel))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> ParsedFeed {
        RssParser.parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn parse_extracts_items_in_document_order() {
        let parsed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <item>
      <title>First Post</title>
      <link>https://example.com/1</link>
      <guid>guid-1</guid>
    </item>
    <item>
      <title>Second Post</title>
      <link>https://example.com/2</link>
      <guid>guid-2</guid>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(parsed.rejected, 0);
        assert_eq!(
            parsed.items,
            vec![
                FeedItem::new("guid-1", "First Post", "https://example.com/1"),
                FeedItem::new("guid-2", "Second Post", "https://example.com/2"),
            ]
        );
    }

    #[test]
    fn falls_back_to_link_when_no_guid() {
        let parsed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>No GUID</title>
      <link>https://example.com/no-guid</link>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(parsed.items[0].guid, "https://example.com/no-guid");
    }

    #[test]
    fn rejects_items_without_any_identifier() {
        let parsed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <title>Anonymous</title>
    </item>
    <item>
      <guid>   </guid>
      <title>Blank guid, no link</title>
    </item>
    <item>
      <guid>kept</guid>
      <title>Kept</title>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(parsed.rejected, 2);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].guid, "kept");
    }

    #[test]
    fn handles_missing_title_and_link() {
        let parsed = parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <guid>g1</guid>
    </item>
  </channel>
</rss>"#,
        );

        assert_eq!(parsed.items[0].title, "(untitled)");
        assert_eq!(parsed.items[0].link, "");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = RssParser.parse(b"<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let parsed = parse(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Empty</title></channel></rss>"#,
        );
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.rejected, 0);
    }
}
