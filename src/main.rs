//! feedwatch — a live-updating, de-duplicated RSS viewer for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ start_poll ┌──────────┐ EngineEvent ┌──────────┐  draw()  ┌──────────┐
//! │ poll.rs  │ ─────────► │ engine/  │ ──────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (task)   │            │ (lib)    │  (channel)  │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘             └──────────┘          └──────────┘
//!                                                       ▲
//!                                                       │ handle_key_event()
//!                                                  ┌──────────┐
//!                                                  │ input.rs │
//!                                                  └──────────┘
//! ```
//!
//! * The library (`feedwatch::*`) owns everything between a URL and a row.
//! * **`app`** — the rows the viewer has received plus scroll position.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: parse args, set up logging, the
//!   runtime and the terminal, and run the event loop.

mod app;
mod input;
mod ui;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use feedwatch::{
    poll, Config, EngineEvent, EngineRegistry, FeedParser, FeedSource, FetchSettings, Fetcher,
    IngestionEngine, ReqwestFetcher, RssParser, Subscription,
};

use app::App;

/// Used when neither a config file nor a URL is given.
const DEFAULT_FEED: &str = "https://feeds.bbci.co.uk/news/rss.xml";

#[derive(Debug, Parser)]
#[command(name = "feedwatch")]
#[command(about = "Poll RSS feeds and show new items as they arrive", long_about = None)]
struct Cli {
    /// JSON feed list ({"rss": [{"id": ..., "url": ...}]})
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra feed URLs; each URL doubles as its feed id
    urls: Vec<String>,

    /// Seconds between polls (overrides the config file)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Poll once, print the items as tab-separated rows, and exit
    #[arg(long)]
    once: bool,

    /// Write logs to this file (the viewer otherwise logs nowhere)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if cli.once {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

/// Configured feeds first, then ad-hoc URLs from the command line.
fn feed_sources(cli: &Cli, config: &Config) -> Vec<FeedSource> {
    let mut sources = config.valid_sources();
    sources.extend(
        cli.urls
            .iter()
            .filter_map(|url| FeedSource::new(url.as_str(), url.as_str())),
    );

    if sources.is_empty() && cli.config.is_none() {
        sources.extend(FeedSource::new(DEFAULT_FEED, DEFAULT_FEED));
    }
    sources
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    // -- configuration -------------------------------------------------------
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let sources = feed_sources(&cli, &config);
    if sources.is_empty() {
        warn!("no usable feeds configured");
    }
    let interval = cli
        .interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.poll_interval());

    // -- runtime and engine collaborators ------------------------------------
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let _enter = runtime.enter();

    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(FetchSettings {
        connect_timeout: config.connect_timeout(),
        request_timeout: config.request_timeout(),
        ..FetchSettings::default()
    })?);
    let parser: Arc<dyn FeedParser> = Arc::new(RssParser::new());
    let factory = || IngestionEngine::new(Arc::clone(&fetcher), Arc::clone(&parser));

    let mut registry = EngineRegistry::new();

    if cli.once {
        let engine = registry.get_or_create(&factory);
        let result = runtime.block_on(run_once(&engine, &sources));
        registry.close();
        return result;
    }

    install_panic_hook();
    run_viewer(&mut registry, &factory, &sources, interval)
}

/// Headless mode: one poll, then print what was ingested.
async fn run_once(engine: &IngestionEngine, sources: &[FeedSource]) -> Result<()> {
    let mut subscription = engine.subscribe();
    engine.start_poll(sources);
    engine.wait_idle().await;

    let mut stdout = io::stdout().lock();
    for item in engine.snapshot() {
        writeln!(stdout, "{}\t{}\t{}", item.guid, item.title, item.link)?;
    }

    while let Ok(event) = subscription.events.try_recv() {
        if let EngineEvent::FeedFailed { feed_id, url, error } = event {
            eprintln!("{feed_id} ({url}): {error}");
        }
    }
    Ok(())
}

/// Fetch the registry's engine, subscribe the viewer to it and start polling.
fn open_engine(
    registry: &mut EngineRegistry,
    factory: &impl Fn() -> IngestionEngine,
    sources: &[FeedSource],
    interval: Duration,
    app: &mut App,
) -> (Arc<IngestionEngine>, Subscription) {
    let engine = registry.get_or_create(factory);
    let mut subscription = engine.subscribe();
    app.attach(std::mem::take(&mut subscription.snapshot));
    poll::spawn(Arc::clone(&engine), sources.to_vec(), interval);
    info!(feeds = sources.len(), ?interval, "viewer attached");
    (engine, subscription)
}

fn run_viewer(
    registry: &mut EngineRegistry,
    factory: &impl Fn() -> IngestionEngine,
    sources: &[FeedSource],
    interval: Duration,
) -> Result<()> {
    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();
    let (mut engine, mut subscription) = open_engine(registry, factory, sources, interval, &mut app);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any events from the engine.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    //   4. Act on refresh / reset requests.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.drain(&mut subscription);
        app.engine_state = engine.state();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.refresh_requested {
            app.refresh_requested = false;
            engine.start_poll(sources);
        }

        if app.reset_requested {
            app.reset_requested = false;
            registry.close();
            (engine, subscription) = open_engine(registry, factory, sources, interval, &mut app);
            app.status = "Reset: all items forgotten".into();
        }

        if app.quit {
            break;
        }
    }

    registry.close();
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
