//! The single owner of store mutation.
//!
//! Fetch tasks finish on whatever worker thread the runtime picks.  Rather than
//! having each of them lock and merge, they post a [`Completion`] onto one
//! unbounded queue, and a single task drains it and applies results one at a
//! time.  The `RwLock` around the store only exists so readers can take
//! consistent snapshots; there is never more than one writer.

use std::sync::{Arc, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::event::EngineEvent;
use super::Shared;
use crate::error::FeedError;
use crate::source::ParsedFeed;

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedContext {
    pub feed_id: String,
    /// Empty for lists handed to the engine directly rather than fetched.
    pub url: String,
}

/// One unit of work for the marshaller.
#[derive(Debug)]
pub(crate) struct Completion {
    pub feed: FeedContext,
    pub outcome: Result<ParsedFeed, FeedError>,
}

pub(crate) struct Marshaller {
    rx: mpsc::UnboundedReceiver<Completion>,
    shared: Arc<Shared>,
    token: CancellationToken,
}

impl Marshaller {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<Completion>,
        shared: Arc<Shared>,
        token: CancellationToken,
    ) -> Self {
        Self { rx, shared, token }
    }

    pub(crate) fn spawn(self, runtime: &tokio::runtime::Handle) -> JoinHandle<()> {
        runtime.spawn(self.run())
    }

    async fn run(mut self) {
        loop {
            // `biased` so a shutdown wins over queued completions.
            let completion = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(completion) => completion,
                    None => break,
                },
            };
            self.apply(completion);
        }

        // Release the jobs of completions that will never be applied.
        self.rx.close();
        let mut dropped = 0usize;
        while self.rx.try_recv().is_ok() {
            self.shared.finish_job();
            dropped += 1;
        }
        debug!(dropped, "marshaller stopped");
    }

    fn apply(&self, completion: Completion) {
        let Completion { feed, outcome } = completion;
        {
            let mut store = self.shared.store.write().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(parsed) => {
                    let report = store.ingest(parsed.items);
                    let rejected = parsed.rejected + report.rejected;
                    debug!(
                        feed_id = %feed.feed_id,
                        appended = report.appended.len(),
                        duplicates = report.duplicates,
                        rejected,
                        "feed ingested"
                    );
                    let appended = report.appended.len();
                    if appended > 0 {
                        store.publish(EngineEvent::Appended {
                            first_index: report.first_index,
                            items: report.appended,
                        });
                    }
                    store.publish(EngineEvent::FeedIngested {
                        feed_id: feed.feed_id,
                        appended,
                        duplicates: report.duplicates,
                        rejected,
                    });
                }
                Err(error) => {
                    warn!(feed_id = %feed.feed_id, url = %feed.url, %error, "feed update abandoned");
                    store.publish(EngineEvent::FeedFailed {
                        feed_id: feed.feed_id,
                        url: feed.url,
                        error,
                    });
                }
            }
        }
        self.shared.finish_job();
    }
}
