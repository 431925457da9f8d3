//! The ordered, append-only list of ingested items.

use crate::source::FeedItem;

/// Items in first-seen order across every poll and every feed.
///
/// Only the engine appends; nothing is ever removed or reordered, so an index
/// into the collection stays valid for the engine's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCollection {
    items: Vec<FeedItem>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, item: FeedItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FeedItem> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeedItem> {
        self.items.iter()
    }

    /// Items appended at or after `start`.
    pub fn since(&self, start: usize) -> &[FeedItem] {
        self.items.get(start..).unwrap_or_default()
    }
}
