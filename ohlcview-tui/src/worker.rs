//! Background worker thread — the blocking provider call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Commands
//! are handled strictly one at a time.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, info};

use ohlcview_core::data::MarketDataProvider;
use ohlcview_core::domain::Query;
use ohlcview_core::{fetch_and_derive, ColumnSet, FetchOutcome, PipelineError};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Fetch { query: Query, columns: ColumnSet },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    FetchDone { outcome: FetchOutcome },
    FetchFailed { ticker: String, error: PipelineError },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    provider: Box<dyn MarketDataProvider>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("ohlcview-worker".into())
        .spawn(move || worker_loop(rx, tx, provider))
}

fn worker_loop(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    provider: Box<dyn MarketDataProvider>,
) {
    info!("worker started with provider {}", provider.name());

    while let Ok(cmd) = rx.recv() {
        match cmd {
            WorkerCommand::Fetch { query, columns } => {
                let resp = match fetch_and_derive(provider.as_ref(), &query, &columns) {
                    Ok(outcome) => WorkerResponse::FetchDone { outcome },
                    Err(error) => WorkerResponse::FetchFailed {
                        ticker: query.ticker().to_string(),
                        error,
                    },
                };
                if tx.send(resp).is_err() {
                    // UI is gone.
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }

    debug!("worker stopped");
}
