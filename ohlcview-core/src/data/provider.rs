//! Data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance,
//! CSV import, in-memory frames) so the pipeline can swap implementations
//! and tests never touch the network.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, Interval, Query};

/// Raw OHLCV bar as delivered by a provider (before validation).
///
/// Any field may be missing; a NaN price counts as missing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// Convert to a well-formed [`Bar`], or `None` if any field is missing.
    pub fn into_bar(self) -> Option<Bar> {
        Some(Bar {
            timestamp: self.timestamp,
            open: present(self.open)?,
            high: present(self.high)?,
            low: present(self.low)?,
            close: present(self.close)?,
            volume: self.volume?,
        })
    }

    /// True if every required field is present.
    pub fn is_complete(&self) -> bool {
        self.into_bar().is_some()
    }
}

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| !x.is_nan())
}

/// Structured error types for provider calls.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("frame error: {0}")]
    Frame(String),

    #[error("provider error: {0}")]
    Other(String),
}

/// What a provider is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarRequest {
    pub symbol: String,
    pub start: NaiveDate,
    /// Exclusive upper bound.
    pub end: NaiveDate,
    pub interval: Interval,
}

impl From<&Query> for BarRequest {
    fn from(query: &Query) -> Self {
        Self {
            symbol: query.ticker().to_string(),
            start: query.start,
            end: query.end,
            interval: query.interval,
        }
    }
}

/// Trait for market-data providers.
///
/// `fetch` returns a bar frame: a `timestamp` column plus whichever of
/// `Open`, `High`, `Low`, `Close`, `Volume` the source supplied, in the
/// source's chronological order. Validation is the pipeline's job.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch(&self, request: &BarRequest) -> Result<DataFrame, ProviderError>;
}

/// Provider that hands back a fixed frame, whatever the request.
///
/// Useful for demos and for exercising the pipeline without a network.
pub struct StaticProvider {
    frame: DataFrame,
}

impl StaticProvider {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, _request: &BarRequest) -> Result<DataFrame, ProviderError> {
        Ok(self.frame.clone())
    }
}
