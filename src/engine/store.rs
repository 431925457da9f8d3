//! Shared ingestion state: the dedup index and the item collection, kept in
//! lockstep, plus the subscribers watching them.
//!
//! Only the marshaller task calls [`Store::ingest`]; everyone else reads
//! through the engine's `RwLock`.

use tokio::sync::mpsc;

use super::collection::ItemCollection;
use super::dedup::DedupIndex;
use super::event::EngineEvent;
use crate::source::FeedItem;

/// What one call to [`Store::ingest`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Collection length before the call, i.e. the index of `appended[0]`.
    pub first_index: usize,
    pub appended: Vec<FeedItem>,
    pub duplicates: usize,
    /// Items dropped because their guid was empty or blank.
    pub rejected: usize,
}

#[derive(Debug, Default)]
pub struct Store {
    index: DedupIndex,
    items: ItemCollection,
    subscribers: Vec<mpsc::UnboundedSender<EngineEvent>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &DedupIndex {
        &self.index
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    /// Merge `items` in order, skipping every guid already seen (including one
    /// seen earlier in the same list).  First write wins: a known guid never
    /// has its title or link replaced.  An item with a blank guid has no
    /// identity and is rejected.
    pub fn ingest(&mut self, items: Vec<FeedItem>) -> IngestReport {
        let mut report = IngestReport {
            first_index: self.items.len(),
            ..IngestReport::default()
        };

        for item in items {
            if item.guid.trim().is_empty() {
                report.rejected += 1;
                continue;
            }
            if !self.index.insert(&item.guid) {
                report.duplicates += 1;
                continue;
            }
            self.items.push(item.clone());
            report.appended.push(item);
        }

        report
    }

    pub(crate) fn subscribe(&mut self, tx: mpsc::UnboundedSender<EngineEvent>) {
        self.subscribers.push(tx);
    }

    /// Send `event` to every live subscriber, forgetting those that hung up.
    pub(crate) fn publish(&mut self, event: EngineEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Every collected guid is indexed and every indexed guid is collected.
    pub fn is_consistent(&self) -> bool {
        self.items.len() == self.index.len()
            && self.items.iter().all(|item| self.index.contains(&item.guid))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(guid: &str, title: &str) -> FeedItem {
        FeedItem::new(guid, title, format!("https://example.com/{guid}"))
    }

    // -- ingest --------------------------------------------------------------

    #[test]
    fn ingest_appends_new_items_in_order() {
        let mut store = Store::new();
        let report = store.ingest(vec![item("i1", "1"), item("i2", "2"), item("i3", "3")]);

        assert_eq!(report.first_index, 0);
        assert_eq!(report.appended.len(), 3);
        assert_eq!(report.duplicates, 0);
        let guids: Vec<_> = store.items().iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["i1", "i2", "i3"]);
        assert!(store.is_consistent());
    }

    #[test]
    fn ingest_is_idempotent() {
        let batch = vec![item("a", "A"), item("b", "B")];

        let mut once = Store::new();
        once.ingest(batch.clone());

        let mut twice = Store::new();
        twice.ingest(batch.clone());
        let report = twice.ingest(batch);

        assert!(report.appended.is_empty());
        assert_eq!(report.duplicates, 2);
        assert_eq!(once.items(), twice.items());
        assert_eq!(once.index(), twice.index());
    }

    #[test]
    fn ingest_keeps_first_title_and_link() {
        let mut store = Store::new();
        store.ingest(vec![FeedItem::new("g1", "First", "https://a.example/g1")]);
        store.ingest(vec![FeedItem::new("g1", "Second", "https://b.example/g1")]);

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items().as_slice()[0].title, "First");
        assert_eq!(store.items().as_slice()[0].link, "https://a.example/g1");
    }

    #[test]
    fn ingest_skips_duplicates_within_one_list() {
        let mut store = Store::new();
        let report = store.ingest(vec![item("x", "first"), item("x", "again"), item("y", "y")]);

        assert_eq!(report.duplicates, 1);
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.items().as_slice()[0].title, "first");
        assert!(store.is_consistent());
    }

    #[test]
    fn ingest_reports_offset_of_appended_rows() {
        let mut store = Store::new();
        store.ingest(vec![item("a", "A")]);
        let report = store.ingest(vec![item("a", "A"), item("b", "B")]);

        assert_eq!(report.first_index, 1);
        assert_eq!(store.items().since(report.first_index), report.appended.as_slice());
    }

    #[test]
    fn ingest_handles_empty_input() {
        let mut store = Store::new();
        let report = store.ingest(vec![]);
        assert_eq!(report, IngestReport::default());
        assert!(store.items().is_empty());
    }

    #[test]
    fn ingest_rejects_blank_guids() {
        let mut store = Store::new();
        let report = store.ingest(vec![
            FeedItem::new("", "No id", "https://example.com/a"),
            item("ok", "Kept"),
            FeedItem::new("   ", "Whitespace id", "https://example.com/b"),
        ]);

        assert_eq!(report.rejected, 2);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.appended, vec![item("ok", "Kept")]);
        assert!(!store.index().contains(""));
        assert!(!store.index().contains("   "));
        assert!(store.is_consistent());
    }

    // -- subscribers ---------------------------------------------------------

    #[test]
    fn publish_drops_closed_subscribers() {
        let mut store = Store::new();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        let (tx_gone, rx_gone) = mpsc::unbounded_channel();
        store.subscribe(tx_live);
        store.subscribe(tx_gone);
        drop(rx_gone);

        store.publish(EngineEvent::FeedIngested {
            feed_id: "f".into(),
            appended: 0,
            duplicates: 0,
            rejected: 0,
        });

        assert_eq!(store.subscriber_count(), 1);
        assert!(rx_live.try_recv().is_ok());
    }
}
