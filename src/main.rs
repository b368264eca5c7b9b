mod action;
mod app;
mod backend;
mod bus;
mod cache;
mod config;
mod console;
mod error;
mod event;
mod favorite;
mod fixture;
mod read_state;
mod screen;
mod types;
mod ui;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::backend::TopicSource;
use crate::bus::NotificationBus;
use crate::config::Config;
use crate::console::EventHandler;
use crate::error::TopicListError;
use crate::fixture::FixtureSource;
use crate::read_state::{JsonReadStore, MemoryReadStore, ReadStore};
use crate::screen::ListScreen;
use crate::types::Page;

#[derive(Debug, Parser)]
#[command(name = "topiclist", version, about = "Browse a forum topic list from the console")]
struct Cli {
    /// Page to open: node:<name>, tab:all or favorites
    #[arg(long)]
    page: Option<String>,

    /// JSON fixture serving the pages
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let page = match &cli.page {
        Some(key) => key.parse::<Page>()?,
        None => config.default_page(),
    };

    let fixture = cli
        .fixture
        .or_else(|| config.backend.fixture.clone())
        .ok_or_else(|| {
            TopicListError::Config("no fixture: pass --fixture or set backend.fixture".to_string())
        })?;
    let latency = Duration::from_millis(config.backend.latency_ms);
    let source: Arc<dyn TopicSource> = Arc::new(FixtureSource::from_path(&fixture, latency)?);

    let read_store: Arc<dyn ReadStore> = match JsonReadStore::open_default() {
        Some(store) => Arc::new(store),
        None => Arc::new(MemoryReadStore::default()),
    };

    run(page, source, read_store, config.logged_in()).await
}

async fn run(
    page: Page,
    source: Arc<dyn TopicSource>,
    read_store: Arc<dyn ReadStore>,
    logged_in: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let bus = NotificationBus::new();
    let screen = ListScreen::new(page, source, read_store, bus, action_tx.clone());
    let mut app = App::new(screen, logged_in);

    let mut events = EventHandler::new();
    let mut stdout = std::io::stdout();

    // Main loop
    let result = loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break Ok(());
                }

                let action = app.handle_event(event);
                if !matches!(action, Action::None) {
                    action_tx.send(action)?;
                }
            }
            Some(action) = action_rx.recv() => {
                if let Err(e) = app.update(action) {
                    break Err(e);
                }
                write!(stdout, "{}", ui::render(&app))?;
                stdout.flush()?;
            }
            else => break Ok(()),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    app.screen.teardown();
    result.map_err(Into::into)
}
