//! The polling and de-duplicated ingestion engine.
//!
//! ```text
//!  start_poll()                        fetch tasks (any worker)
//! ┌────────────┐  spawn per feed  ┌──────────────────────────────┐
//! │ dispatch   │ ───────────────► │ Fetcher → ResponseHandler    │
//! └────────────┘                  └──────────────┬───────────────┘
//!                                                │ Completion (mpsc)
//!                                                ▼
//!                                   ┌──────────────────────────┐
//!                                   │ marshal (single task)    │
//!                                   │ Store::ingest + publish  │
//!                                   └────────────┬─────────────┘
//!                                                │ EngineEvent
//!                                                ▼
//!                                           subscribers
//! ```
//!
//! * **`dedup`** / **`collection`** — the two pieces of state, wrapped together
//!   in [`Store`] so they can only change in lockstep.
//! * **`dispatch`** — one task per configured feed, fire-and-forget.
//! * **`handler`** — status check and parsing, off the ingestion context.
//! * **`marshal`** — the only code that mutates the store.
//!
//! Dropping the engine (or calling [`IngestionEngine::shutdown`]) cancels a
//! liveness token; in-flight fetches stop and late completions are discarded.

mod collection;
mod dedup;
mod dispatch;
mod event;
mod handler;
mod marshal;
mod store;

pub use collection::ItemCollection;
pub use dedup::DedupIndex;
pub use event::EngineEvent;
pub use handler::ResponseHandler;
pub use store::{IngestReport, Store};

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::fetch::Fetcher;
use crate::source::{FeedItem, FeedParser, FeedSource, ParsedFeed};
use dispatch::FetchDispatcher;
use marshal::{Completion, FeedContext, Marshaller};

/// Coarse lifecycle of an engine.  There is no error state: feed failures are
/// absorbed and reported as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing has been submitted yet.
    Empty,
    /// At least one fetch or ingest job is outstanding.
    Polling,
    /// Work has been done and nothing is outstanding.
    Idle,
}

#[derive(Debug, Clone, Copy, Default)]
struct Progress {
    in_flight: usize,
    submitted: u64,
}

/// State shared between the engine handle, the dispatcher and the marshaller.
pub(crate) struct Shared {
    store: RwLock<Store>,
    progress: watch::Sender<Progress>,
}

impl Shared {
    fn new() -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            store: RwLock::new(Store::new()),
            progress,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn begin_job(&self) {
        self.progress.send_modify(|p| {
            p.in_flight += 1;
            p.submitted += 1;
        });
    }

    pub(crate) fn finish_job(&self) {
        self.progress.send_modify(|p| p.in_flight = p.in_flight.saturating_sub(1));
    }
}

/// A consistent starting point plus the stream of everything after it.
#[derive(Debug)]
pub struct Subscription {
    /// The collection at the moment of subscribing.
    pub snapshot: Vec<FeedItem>,
    /// Every event applied after `snapshot` was taken.
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

/// Owns the de-duplicated item collection and everything that feeds it.
///
/// Share it behind an [`Arc`]; every method takes `&self`.
pub struct IngestionEngine {
    shared: Arc<Shared>,
    dispatcher: FetchDispatcher,
    tx: mpsc::UnboundedSender<Completion>,
    token: CancellationToken,
}

impl IngestionEngine {
    /// Create an engine with empty state and start its marshaller.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.  Use
    /// [`with_runtime`](Self::with_runtime) to pass a handle explicitly.
    pub fn new(fetcher: Arc<dyn Fetcher>, parser: Arc<dyn FeedParser>) -> Self {
        Self::with_runtime(fetcher, parser, tokio::runtime::Handle::current())
    }

    pub fn with_runtime(
        fetcher: Arc<dyn Fetcher>,
        parser: Arc<dyn FeedParser>,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let shared = Arc::new(Shared::new());
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        Marshaller::new(rx, Arc::clone(&shared), token.clone()).spawn(&runtime);

        let dispatcher = FetchDispatcher::new(
            fetcher,
            ResponseHandler::new(parser),
            tx.clone(),
            Arc::clone(&shared),
            token.clone(),
            runtime,
        );

        Self {
            shared,
            dispatcher,
            tx,
            token,
        }
    }

    /// Issue one fetch per source without waiting for any of them.
    ///
    /// Returns how many fetches were issued (zero once shut down).
    pub fn start_poll(&self, sources: &[FeedSource]) -> usize {
        let issued = self.dispatcher.start_poll(sources);
        info!(feeds = issued, "poll started");
        issued
    }

    /// Queue an already-parsed list for ingestion under `feed_id`.
    ///
    /// Goes through the same serialized path as fetched results, so it is
    /// ordered with respect to them.
    pub fn ingest(&self, feed_id: impl Into<String>, items: Vec<FeedItem>) {
        if self.token.is_cancelled() {
            return;
        }
        self.shared.begin_job();
        let completion = Completion {
            feed: FeedContext {
                feed_id: feed_id.into(),
                url: String::new(),
            },
            outcome: Ok(ParsedFeed { items, rejected: 0 }),
        };
        if self.tx.send(completion).is_err() {
            self.shared.finish_job();
        }
    }

    /// Register an observer.
    ///
    /// The snapshot and the registration are taken under the same lock, so
    /// no row is missed or delivered twice.
    pub fn subscribe(&self) -> Subscription {
        let (tx, events) = mpsc::unbounded_channel();
        let mut store = self.shared.store.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = store.items().as_slice().to_vec();
        store.subscribe(tx);
        Subscription { snapshot, events }
    }

    pub fn snapshot(&self) -> Vec<FeedItem> {
        self.shared.read().items().as_slice().to_vec()
    }

    pub fn len(&self) -> usize {
        self.shared.read().items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.shared.read().index().contains(guid)
    }

    /// Run `f` against a consistent view of the index and collection.
    pub fn inspect<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&*self.shared.read())
    }

    pub fn state(&self) -> EngineState {
        let progress = *self.shared.progress.borrow();
        if progress.in_flight > 0 {
            EngineState::Polling
        } else if progress.submitted == 0 {
            EngineState::Empty
        } else {
            EngineState::Idle
        }
    }

    /// Resolve once nothing is outstanding, or once the engine shuts down.
    pub async fn wait_idle(&self) {
        let mut progress = self.shared.progress.subscribe();
        tokio::select! {
            _ = self.token.cancelled() => {}
            _ = progress.wait_for(|p| p.in_flight == 0) => {}
        }
    }

    /// Resolve when the engine shuts down.
    pub async fn closed(&self) {
        self.token.cancelled().await;
    }

    /// Stop the engine.  Outstanding fetches are abandoned and any result that
    /// still arrives is discarded.  The collection stays readable.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            debug!("engine shutting down");
            self.token.cancel();
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for IngestionEngine {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
