//! Test helpers for building app state and fake outcomes

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{Duration, NaiveDate};
use ohlcview_core::domain::{Bar, DerivedBar, Interval};
use ohlcview_core::{AppConfig, ColumnSet, DataQualityWarning, FetchOutcome, Table};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
}

/// App wired to channels the test holds the other ends of.
pub fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let app = AppState::new(cmd_tx, resp_rx, &AppConfig::default(), today());
    (app, cmd_rx, resp_tx)
}

/// A derived-column table of `rows` rising 15-minute bars.
pub fn table(rows: usize) -> Table {
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let bars = (0..rows)
        .map(|i| {
            let open = 180.0 + i as f64;
            let close = if i % 2 == 0 { open + 0.5 } else { open - 0.5 };
            DerivedBar::from_bar(Bar {
                timestamp: start + Duration::minutes(15 * i as i64),
                open,
                high: open + 1.0,
                low: open - 1.0,
                close,
                volume: 120_000,
            })
        })
        .collect();
    Table::new("AAPL", Interval::M15, &ColumnSet::Derived, bars)
}

pub fn outcome(rows: usize, dropped: usize) -> FetchOutcome {
    let warnings = if dropped > 0 {
        vec![DataQualityWarning {
            dropped,
            total: rows + dropped,
        }]
    } else {
        Vec::new()
    };
    FetchOutcome {
        table: table(rows),
        warnings,
    }
}
