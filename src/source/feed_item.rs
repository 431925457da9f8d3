//! The core data type shared by every feed source.
//!
//! `FeedItem` is one entry from a feed document.  The parser converts its
//! native format into `FeedItem`s so the engine (de-duplication, ordering,
//! rendering) stays format-agnostic.
//!
//! ## For contributors
//!
//! If you are adding a new document format you do **not** need to modify this
//! file.  Construct `FeedItem` values in your parser's `parse()` implementation
//! and make sure `guid` is stable across polls.

/// A single feed entry, normalised from any document format.
///
/// These three fields are exactly what the viewer renders: one row per unique
/// `guid`, in the order the engine first saw it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FeedItem {
    /// Unique identifier used for de-duplication.
    ///
    /// For RSS this is the `<guid>` element (falling back to `<link>`).
    /// Items for which no identifier can be extracted are rejected by the
    /// parser and never reach the engine.
    pub guid: String,

    /// Human-readable headline.
    pub title: String,

    /// URL to the full content.  Empty when the document provides none.
    pub link: String,
}

impl FeedItem {
    pub fn new(guid: impl Into<String>, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            link: link.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
