//! feedwatch — concurrent RSS polling with de-duplicated ingestion.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ FeedSource ┌───────────┐ EngineEvent ┌──────────┐
//! │ config.rs │ ─────────► │ engine/   │ ──────────► │ viewer   │
//! │ (registry)│            │ (state)   │  (channel)  │ (bin)    │
//! └───────────┘            └───────────┘             └──────────┘
//!                            ▲       ▲
//!               start_poll() │       │ fetch + parse
//!                      ┌─────────┐ ┌───────────────────┐
//!                      │ poll.rs │ │ fetch.rs, source/ │
//!                      └─────────┘ └───────────────────┘
//! ```
//!
//! * **`source/`** — [`FeedItem`], [`FeedSource`] and the [`FeedParser`]
//!   trait with its RSS implementation.
//! * **`config`** — the JSON feed list and the rules for which entries are
//!   usable.
//! * **`fetch`** — the [`Fetcher`] transport trait and its reqwest
//!   implementation.
//! * **`engine`** — the de-duplicated item collection and its single-writer
//!   ingestion path.
//! * **`registry`** — keeps at most one engine alive.
//! * **`poll`** — re-polls on a timer.

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod poll;
pub mod registry;
pub mod source;

pub use config::Config;
pub use engine::{EngineEvent, EngineState, IngestionEngine, Subscription};
pub use error::{ConfigError, FeedError};
pub use fetch::{FetchResponse, FetchSettings, Fetcher, ReqwestFetcher};
pub use registry::EngineRegistry;
pub use source::{FeedItem, FeedParser, FeedSource, ParsedFeed, RssParser};
