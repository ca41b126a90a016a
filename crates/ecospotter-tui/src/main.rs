mod app;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};

use anyhow::{Context, Result};
use ecospotter_core::{Config, Provider};
use tracing::{info, warn};

use crate::app::App;

const LOG_FILE_NAME: &str = "ecospotter.log";

#[tokio::main]
async fn main() -> Result<()> {
    init_file_logging()?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "could not read config, using defaults");
            Config::new()
        }
    }
    .with_env_keys();

    let provider = Provider::from_config(&config)?;
    let client = provider.build(&config)?;
    info!(provider = provider.as_str(), "starting ecospotter");

    let mut app = App::new(&config, provider, client).await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

/// The UI owns the terminal, so logs go to a file next to the config.
fn init_file_logging() -> Result<()> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory '{}'", dir.display()))?;

    let log_path = dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file '{}'", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();
    Ok(())
}
