//! RapydView: a terminal browser for a remote file service.
//!
//! This binary initialises the terminal, runs the main event loop,
//! and restores the terminal on exit or panic.
//!
//! Usage: `rapyd [BASE_URL]`. The URL overrides `server.base_url` from the
//! config file.

mod app;
mod background;
mod icons;
mod image_preview;
mod input;
mod render;
mod ui;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rapyd_core::config::settings::{config_dir, expand_home};
use rapyd_core::remote::http_client;
use rapyd_core::{
    ApiEndpoints, Config, ContentClient, HttpListingClient, ListingService, Preferences,
    PreviewDispatcher, Theme,
};
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::app::{App, AppMode};
use crate::background::{BackgroundMessage, TaskRunner};
use crate::image_preview::ImagePreviewState;
use crate::input::{handle_key, InputAction, InputState};
use crate::render::render;

/// Logs go to a file so they never draw over the UI.
fn init_tracing() {
    let path = std::env::temp_dir().join("rapyd.log");
    let writer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(io::sink),
    };
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Installs a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn load_config() -> anyhow::Result<Config> {
    let config = match Config::default_path() {
        Some(path) => Config::load_or_default(&path)?,
        None => Config::default(),
    };
    Ok(match std::env::args().nth(1) {
        Some(base_url) => config.with_base_url(base_url),
        None => config,
    })
}

fn load_prefs(path: Option<&PathBuf>) -> Preferences {
    let Some(path) = path else {
        return Preferences::default();
    };
    Preferences::load(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
        Preferences::default()
    })
}

/// The dark palette, replaced by `ui.theme_file` when one is configured.
fn load_dark_theme(config: &Config) -> Theme {
    let Some(file) = config.ui.theme_file.as_deref() else {
        return Theme::dark();
    };
    let path = expand_home(file);
    Theme::load(&path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "falling back to the built-in theme");
        Theme::dark()
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    let endpoints = ApiEndpoints::new(&config.server.base_url)?;
    tracing::info!(base_url = %config.server.base_url, "starting");

    let prefs_path = config_dir().map(|d| d.join("prefs.toml"));
    let prefs = load_prefs(prefs_path.as_ref());

    let http = http_client(config.server.timeout())?;
    let listing: Arc<dyn ListingService> = Arc::new(HttpListingClient::new(
        http.clone(),
        endpoints.clone(),
        config.server.timeout(),
    ));
    let content = ContentClient::new(http, endpoints.clone(), config.server.timeout());
    let dispatcher = PreviewDispatcher::new(endpoints, config.preview.text_extensions.as_slice());
    let app = App::new(dispatcher, &config, prefs, load_dark_theme(&config));

    let (tx, rx) = mpsc::unbounded_channel();
    let runner = TaskRunner {
        listing,
        content,
        download_dir: config.download.resolved_dir(),
        max_text_lines: config.preview.max_text_lines,
        prefs_path,
        tx,
    };

    install_panic_hook();
    let mut terminal = setup_terminal()?;

    // Picker must be created after alternate screen (raw mode) but before event loop
    let picker = match ratatui_image::picker::Picker::from_query_stdio() {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::warn!("terminal image protocol detection failed: {e}");
            None
        }
    };

    let result = run_app(&mut terminal, app, runner, rx, picker);

    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        tracing::error!(error = %e, "exiting after error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    runner: TaskRunner,
    mut rx: mpsc::UnboundedReceiver<BackgroundMessage>,
    picker: Option<ratatui_image::picker::Picker>,
) -> anyhow::Result<()> {
    let mut image_state = picker.map(ImagePreviewState::new);
    let mut input_state = InputState::new();

    let (mut app, effects) = app.start();
    runner.run(effects);

    loop {
        // 1. Drain background results
        while let Ok(msg) = rx.try_recv() {
            app = app.apply_message(msg);
        }

        if app.preview().is_none() {
            if let Some(state) = image_state.as_mut().filter(|s| s.is_cached()) {
                state.invalidate();
            }
        }

        // 2. Render
        terminal.draw(|f| render(f, &app, image_state.as_mut()))?;

        if app.should_quit() {
            break;
        }

        // 3. Poll for key presses
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let (action, next_input_state) = handle_key(key, app.mode(), &input_state);
        input_state = next_input_state;

        let (next, effects) = match action {
            InputAction::Command(cmd) => app.handle_command(cmd),
            InputAction::EnterMode(mode) => (app.with_mode(mode), Vec::new()),
            InputAction::ExitSearch => (app.with_mode(AppMode::Normal), Vec::new()),
            InputAction::SearchChar(c) => app.search_push(c),
            InputAction::SearchBackspace => app.search_pop(),
            InputAction::None => (app, Vec::new()),
        };
        app = next;
        runner.run(effects);
    }

    Ok(())
}
