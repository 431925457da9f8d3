//! At most one live engine per application.
//!
//! The viewer asks the registry for "the" engine.  If one is open it gets that
//! one back; after [`EngineRegistry::close`] the next request builds a fresh
//! engine with empty state, so nothing seen before carries over.

use std::sync::Arc;

use tracing::debug;

use crate::engine::IngestionEngine;

#[derive(Default)]
pub struct EngineRegistry {
    slot: Option<Arc<IngestionEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the open engine, or build one with `create`.
    ///
    /// An engine that was shut down behind the registry's back counts as
    /// closed and is replaced.
    pub fn get_or_create<F>(&mut self, create: F) -> Arc<IngestionEngine>
    where
        F: FnOnce() -> IngestionEngine,
    {
        if let Some(engine) = &self.slot {
            if !engine.is_shut_down() {
                return Arc::clone(engine);
            }
        }
        debug!("creating ingestion engine");
        let engine = Arc::new(create());
        self.slot = Some(Arc::clone(&engine));
        engine
    }

    pub fn get(&self) -> Option<Arc<IngestionEngine>> {
        self.slot
            .as_ref()
            .filter(|engine| !engine.is_shut_down())
            .cloned()
    }

    /// Shut the open engine down and empty the slot.  Returns whether an
    /// engine was open.
    pub fn close(&mut self) -> bool {
        match self.slot.take() {
            Some(engine) => {
                engine.shutdown();
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.get().is_some()
    }
}
