use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use feedwatch::{EngineEvent, EngineState, FeedItem, Subscription};

/// Viewer state.  Rows mirror the engine's collection: the subscription
/// snapshot followed by every `Appended` event, in engine order.
pub struct App {
    /// Rows received from the engine, first-seen order.
    pub items: Vec<FeedItem>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Whether the user asked for an immediate poll.
    pub refresh_requested: bool,
    /// Whether the user asked to close the engine and start over.
    pub reset_requested: bool,
    /// Last feed outcome.
    pub status: String,
    /// Engine lifecycle, refreshed every tick.
    pub engine_state: EngineState,
    /// When the last feed update was merged.
    pub last_update: Option<DateTime<Local>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            refresh_requested: false,
            reset_requested: false,
            status: "Starting…".into(),
            engine_state: EngineState::Empty,
            last_update: None,
        }
    }

    /// Replace all rows with a fresh subscription snapshot.
    pub fn attach(&mut self, subscription_snapshot: Vec<FeedItem>) {
        self.items = subscription_snapshot;
        self.list_state = ListState::default();
    }

    /// Drain every pending event from the engine.
    pub fn drain(&mut self, subscription: &mut Subscription) {
        while let Ok(event) = subscription.events.try_recv() {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Appended { first_index, items } => {
                // Rows are append-only, so an event can only continue where
                // we left off.
                debug_assert_eq!(first_index, self.items.len());
                self.items.extend(items);
            }
            EngineEvent::FeedIngested {
                feed_id, appended, ..
            } => {
                self.status = format!("{feed_id}: {appended} new");
                self.last_update = Some(Local::now());
            }
            EngineEvent::FeedFailed { feed_id, error, .. } => {
                self.status = format!("{feed_id}: {error}");
            }
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.list_state.select(Some(self.items.len() - 1));
        }
    }
}
