//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use ohlcview_core::data::ProviderError;
use ohlcview_core::domain::{parse_date, Interval, Query, QueryError};
use ohlcview_core::{AppConfig, ColumnSet, PipelineError, RenderOptions, Table};

use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;

/// Rows moved by PgUp / PgDn.
pub const PAGE_ROWS: usize = 10;

/// Which widget has keyboard focus, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Ticker,
    Start,
    End,
    Interval,
    Columns,
    FetchButton,
    Table,
}

impl Focus {
    pub const ALL: [Focus; 7] = [
        Focus::Ticker,
        Focus::Start,
        Focus::End,
        Focus::Interval,
        Focus::Columns,
        Focus::FetchButton,
        Focus::Table,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Focus {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Focus {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Text fields swallow printable keys, including `q`.
    pub fn is_text(self) -> bool {
        matches!(self, Focus::Ticker | Focus::Start | Focus::End)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Input,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Other => "ERR",
        }
    }

    fn of(error: &PipelineError) -> Self {
        match error {
            PipelineError::Provider(e) => match e {
                ProviderError::NetworkUnreachable(_)
                | ProviderError::Http { .. }
                | ProviderError::RateLimited => ErrorCategory::Network,
                ProviderError::SymbolNotFound { .. }
                | ProviderError::ResponseFormatChanged(_)
                | ProviderError::Frame(_) => ErrorCategory::Data,
                ProviderError::Io(_) | ProviderError::Other(_) => ErrorCategory::Other,
            },
            PipelineError::NoData { .. }
            | PipelineError::Schema { .. }
            | PipelineError::ColumnType { .. } => ErrorCategory::Data,
        }
    }
}

/// Sidebar form contents. Dates stay as text until a fetch is requested.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub interval: Interval,
    pub columns: ColumnSet,
}

impl FormState {
    pub fn from_config(config: &AppConfig, today: NaiveDate) -> Self {
        let start = today - Duration::days(i64::from(config.defaults.lookback_days));
        Self {
            ticker: config.defaults.ticker.clone(),
            start: start.format("%Y-%m-%d").to_string(),
            end: today.format("%Y-%m-%d").to_string(),
            interval: config.defaults.interval,
            columns: config.column_set().unwrap_or_default(),
        }
    }

    pub fn query(&self) -> Result<Query, QueryError> {
        let start = parse_date("start", &self.start)?;
        let end = parse_date("end", &self.end)?;
        Query::new(&self.ticker, start, end, self.interval)
    }

    /// The text buffer behind a text-field focus.
    pub fn text_mut(&mut self, focus: Focus) -> Option<&mut String> {
        match focus {
            Focus::Ticker => Some(&mut self.ticker),
            Focus::Start => Some(&mut self.start),
            Focus::End => Some(&mut self.end),
            _ => None,
        }
    }

    /// Derived ↔ plain. A custom list from the config file steps to derived.
    pub fn cycle_columns(&mut self) {
        self.columns = match self.columns {
            ColumnSet::Derived => ColumnSet::Plain,
            ColumnSet::Plain | ColumnSet::Custom(_) => ColumnSet::Derived,
        };
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,
    pub focus: Focus,
    pub form: FormState,

    // Results
    pub table: Option<Table>,
    pub scroll: usize,
    pub render_opts: RenderOptions,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub fetch_in_progress: bool,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        config: &AppConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            running: true,
            focus: Focus::Ticker,
            form: FormState::from_config(config, today),
            table: None,
            scroll: 0,
            render_opts: RenderOptions::from(&config.render),
            worker_tx,
            worker_rx,
            fetch_in_progress: false,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    /// Validate the form and hand the query to the worker.
    ///
    /// Ignored while a fetch is already running.
    pub fn request_fetch(&mut self) {
        if self.fetch_in_progress {
            self.set_warning("A fetch is already running");
            return;
        }

        let query = match self.form.query() {
            Ok(query) => query,
            Err(e) => {
                self.push_error(ErrorCategory::Input, e.to_string(), "input form".into());
                return;
            }
        };

        let ticker = query.ticker().to_string();
        let interval = query.interval;
        let cmd = WorkerCommand::Fetch {
            query,
            columns: self.form.columns.clone(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Other,
                "Background worker is not running".into(),
                ticker,
            );
            return;
        }

        self.fetch_in_progress = true;
        self.set_status(format!("Fetching {ticker} ({interval})..."));
    }

    pub fn apply_response(&mut self, resp: WorkerResponse) {
        self.fetch_in_progress = false;
        match resp {
            WorkerResponse::FetchDone { outcome } => {
                let rows = outcome.table.len();
                let ticker = outcome.table.ticker.clone();
                self.table = Some(outcome.table);
                self.scroll = 0;
                match outcome.warnings.first() {
                    Some(warning) => self.set_warning(warning.to_string()),
                    None => self.set_status(format!("Fetched {rows} rows for {ticker}")),
                }
            }
            WorkerResponse::FetchFailed { ticker, error } => {
                self.push_error(ErrorCategory::of(&error), error.user_message(), ticker);
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.table.as_ref().map_or(0, Table::len)
    }

    /// Move the table scroll by `delta` rows, clamped to the table.
    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.row_count().saturating_sub(1);
        let next = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
        self.scroll = next.min(max);
    }

    pub fn scroll_to_end(&mut self) {
        self.scroll = self.row_count().saturating_sub(1);
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}
