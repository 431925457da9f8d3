//! Notifications delivered to subscribers.

use crate::error::FeedError;
use crate::source::FeedItem;

/// Something an observer of the engine needs to know about.
///
/// Events for one subscriber arrive in the order the engine applied them, so
/// replaying the `Appended` events on top of the subscription snapshot always
/// reproduces the engine's collection exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// New rows were appended.  `first_index` is the position of `items[0]`
    /// in the collection.
    Appended {
        first_index: usize,
        items: Vec<FeedItem>,
    },

    /// A feed update was merged, possibly contributing nothing new.
    FeedIngested {
        feed_id: String,
        appended: usize,
        duplicates: usize,
        rejected: usize,
    },

    /// A feed update was abandoned.  Nothing from this feed was ingested.
    FeedFailed {
        feed_id: String,
        url: String,
        error: FeedError,
    },
}
