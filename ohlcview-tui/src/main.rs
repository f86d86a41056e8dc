//! OHLCView TUI — input sidebar and result table for one ticker at a time.
//!
//! Layout:
//! - Input Options — ticker, start/end dates, interval, column set, Fetch Data
//! - Results — derived OHLCV table for the last successful fetch
//! - Status bar — key hints and the latest status, warning or error
//!
//! Fetches run on a background worker thread; the UI never blocks on the
//! network.

mod app;
mod input;
mod theme;
mod ui;
mod worker;

#[cfg(test)]
mod test_helpers;

use std::fs::File;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use ohlcview_core::AppConfig;
use ohlcview_core::data::{CsvProvider, MarketDataProvider, YahooProvider};

use crate::app::AppState;
use crate::worker::WorkerCommand;

#[derive(Parser)]
#[command(name = "ohlcview-tui", about = "OHLCView — interactive OHLCV table")]
struct Args {
    /// Config file (TOML). Defaults to the per-user config if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read bars from a CSV export instead of Yahoo Finance.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write logs to this file. Nothing is logged otherwise.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_file_logging(path)?;
    }

    let config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;

    let provider: Box<dyn MarketDataProvider> = match &args.csv {
        Some(path) => Box::new(CsvProvider::new(path)),
        None => Box::new(YahooProvider::new(&config.yahoo)?),
    };
    info!("starting with provider {}", provider.name());

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, provider)
        .context("failed to start worker thread")?;

    let today = chrono::Local::now().date_naive();
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, &config, today);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker. An in-flight fetch finishes first.
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_file_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
