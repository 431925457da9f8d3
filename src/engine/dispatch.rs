//! Issuing one fetch per feed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::handler::ResponseHandler;
use super::marshal::{Completion, FeedContext};
use super::Shared;
use crate::error::FeedError;
use crate::fetch::Fetcher;
use crate::source::FeedSource;

/// Spawns an independent task per feed and returns immediately.
///
/// Feeds never wait on one another: a slow or hung fetch only delays its own
/// completion.  Calling [`start_poll`](Self::start_poll) again while fetches
/// are outstanding adds another independent set; nothing is coalesced or
/// cancelled.
pub(crate) struct FetchDispatcher {
    fetcher: Arc<dyn Fetcher>,
    handler: ResponseHandler,
    tx: mpsc::UnboundedSender<Completion>,
    shared: Arc<Shared>,
    token: CancellationToken,
    runtime: tokio::runtime::Handle,
}

impl FetchDispatcher {
    pub(crate) fn new(
        fetcher: Arc<dyn Fetcher>,
        handler: ResponseHandler,
        tx: mpsc::UnboundedSender<Completion>,
        shared: Arc<Shared>,
        token: CancellationToken,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        Self {
            fetcher,
            handler,
            tx,
            shared,
            token,
            runtime,
        }
    }

    pub(crate) fn start_poll(&self, sources: &[FeedSource]) -> usize {
        if self.token.is_cancelled() {
            return 0;
        }

        let mut issued = 0;
        for source in sources {
            if !source.is_valid() {
                debug!(?source, "skipping feed source without id or url");
                continue;
            }
            self.shared.begin_job();
            issued += 1;

            let fetcher = Arc::clone(&self.fetcher);
            let handler = self.handler.clone();
            let tx = self.tx.clone();
            let shared = Arc::clone(&self.shared);
            let token = self.token.clone();
            let feed = FeedContext {
                feed_id: source.id.clone(),
                url: source.url.clone(),
            };

            self.runtime.spawn(async move {
                let response = tokio::select! {
                    _ = token.cancelled() => {
                        shared.finish_job();
                        return;
                    }
                    response = fetcher.fetch(&feed.url) => response,
                };

                // Parsing is CPU-bound; keep it off the async workers.
                let outcome = match tokio::task::spawn_blocking(move || handler.handle(response)).await {
                    Ok(outcome) => outcome,
                    Err(err) => Err(FeedError::Parse(format!("parser task failed: {err}"))),
                };

                // The liveness guard: once the engine is gone its queue is
                // closed or cancelled, and the result is dropped here.
                if token.is_cancelled() {
                    debug!(feed_id = %feed.feed_id, "discarding completion for closed engine");
                    shared.finish_job();
                } else if tx.send(Completion { feed, outcome }).is_err() {
                    debug!("discarding completion for closed engine");
                    shared.finish_job();
                }
            });
        }

        issued
    }
}
