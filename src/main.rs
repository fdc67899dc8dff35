mod api;
mod app;
mod components;
mod config;
mod dispatch;
mod error;
mod event;
mod folder;
mod handler;
mod logging;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info};

use crate::api::http::HttpFolderApi;
use crate::api::memory::MemoryFolderApi;
use crate::api::FolderApi;
use crate::app::App;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::tui::{install_panic_hook, Tui};

/// Makes loading states visible against the in-memory backend.
const DEMO_LATENCY: Duration = Duration::from_millis(120);

/// A terminal browser for a remote folder hierarchy.
#[derive(Parser, Debug)]
#[command(name = "fb", version, about)]
struct Cli {
    /// Folder to open (defaults to the configured start path)
    path: Option<String>,

    /// Path to a config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Use the built-in in-memory backend with sample data
    #[arg(long)]
    demo: bool,

    /// Disable mouse capture
    #[arg(long)]
    no_mouse: bool,

    /// Initial view: grid, list or tree
    #[arg(long)]
    view: Option<String>,

    /// Log filter directive (e.g. "debug", "folder_browser=trace")
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags the user actually passed, as a partial config.
    fn overrides(&self) -> AppConfig {
        let mut overrides = AppConfig::default();
        overrides.api.base_url = self.api_url.clone();
        if self.demo {
            overrides.api.demo = Some(true);
        }
        if self.no_mouse {
            overrides.general.mouse = Some(false);
        }
        overrides.browser.view = self.view.clone();
        overrides.logging.level = self.log_level.clone();
        overrides
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    match logging::init(config.log_level(), config.log_file()) {
        Ok(path) => info!(log_file = %path.display(), "logging initialized"),
        Err(e) => eprintln!("warning: logging disabled: {}", e),
    }

    let api: Arc<dyn FolderApi> = if config.demo() {
        info!(root = config.root_path(), "using in-memory demo backend");
        Arc::new(MemoryFolderApi::demo(config.root_path()).with_latency(DEMO_LATENCY))
    } else {
        info!(base_url = config.base_url(), "using HTTP backend");
        Arc::new(HttpFolderApi::new(config.base_url()))
    };

    let start = folder::path::normalize(cli.path.as_deref().unwrap_or(config.start_path()));
    if !folder::path::is_within(&start, &folder::path::normalize(config.root_path())) {
        return Err(AppError::InvalidPath(format!(
            "{} is outside {}",
            start,
            config.root_path()
        )));
    }

    install_panic_hook();

    let mut tui = Tui::new(config.mouse_enabled())?;
    info!(
        view = config.view(),
        theme = config.theme_scheme(),
        mouse = config.mouse_enabled(),
        "starting"
    );
    let mut app = App::new(&config);
    let mut events = EventHandler::new(Duration::from_millis(50));
    let event_tx = events.sender();

    app.start(&start);

    loop {
        tui.draw(&mut app)?;

        for request in app.take_requests() {
            dispatch::spawn(Arc::clone(&api), request, event_tx.clone());
        }

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Mouse(mouse) => handler::handle_mouse_event(&mut app, mouse, Instant::now()),
            Event::Tick => app.tick(Instant::now()),
            Event::Resize(_, _) => {}
            Event::Api(response) => app.handle_api(response),
        }

        if app.should_quit {
            break;
        }
    }

    if let Err(e) = tui.restore() {
        error!(error = %e, "failed to restore terminal");
        return Err(e);
    }
    info!("exiting");
    Ok(())
}
