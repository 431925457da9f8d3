//! Periodic polling.
//!
//! Runs as a tokio task that calls [`IngestionEngine::start_poll`] on a fixed
//! interval, first tick immediately.  It stops by itself when the engine shuts
//! down.
//!
//! ## For contributors
//!
//! The poller does not wait for a round to finish before starting the next
//! one.  With a short interval and slow feeds, rounds overlap; the engine
//! allows that and de-duplicates the results.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::engine::IngestionEngine;
use crate::source::FeedSource;

/// Spawn the polling task on the current runtime.
pub fn spawn(
    engine: Arc<IngestionEngine>,
    sources: Vec<FeedSource>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = engine.closed() => break,
                _ = ticker.tick() => {
                    engine.start_poll(&sources);
                }
            }
        }
        debug!("poller stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::FeedError;
    use crate::fetch::{FetchResponse, Fetcher};
    use crate::source::RssParser;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for Counting {
        async fn fetch(&self, _url: &str) -> Result<FetchResponse, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResponse {
                status: 304,
                body: "".into(),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn polls_immediately_then_every_interval() {
        let fetcher = Arc::new(Counting::default());
        let engine = Arc::new(IngestionEngine::new(fetcher.clone(), Arc::new(RssParser::new())));
        let sources = vec![FeedSource::new("f", "http://example.com/feed").unwrap()];

        let task = spawn(engine.clone(), sources, Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);

        engine.shutdown();
        task.await.unwrap();
    }
}
