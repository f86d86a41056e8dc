//! Query — one user-triggered fetch request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::interval::{Interval, UnknownInterval};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("ticker must not be empty")]
    EmptyTicker,

    #[error("invalid ticker '{0}' (letters, digits and . ^ = - only)")]
    InvalidTicker(String),

    #[error(transparent)]
    UnknownInterval(#[from] UnknownInterval),

    #[error("invalid {field} date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

/// A validated fetch request.
///
/// The date range is passed through to the provider as-is; `end < start` is
/// left for the provider to reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl Query {
    /// Build a query. The ticker is trimmed and upper-cased, and may only
    /// contain ASCII letters, digits and `.`, `^`, `=`, `-`
    /// (`BRK-B`, `^GSPC`, `EURUSD=X`, `7203.T`).
    pub fn new(
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<Self, QueryError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(QueryError::EmptyTicker);
        }
        if !ticker.chars().all(is_ticker_char) {
            return Err(QueryError::InvalidTicker(ticker));
        }
        Ok(Self {
            ticker,
            start,
            end,
            interval,
        })
    }

    /// Build a query from untyped form input (dates as `YYYY-MM-DD`).
    pub fn parse(ticker: &str, start: &str, end: &str, interval: &str) -> Result<Self, QueryError> {
        let interval: Interval = interval.parse()?;
        let start = parse_date("start", start)?;
        let end = parse_date("end", end)?;
        Self::new(ticker, start, end, interval)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }
}

fn is_ticker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')
}

/// Parse a `YYYY-MM-DD` date from a named form field.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| QueryError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn normalizes_ticker() {
        let q = Query::new("  aapl ", d(2024, 1, 2), d(2024, 1, 5), Interval::M15).unwrap();
        assert_eq!(q.ticker(), "AAPL");
    }

    #[test]
    fn rejects_blank_ticker() {
        let err = Query::new("   ", d(2024, 1, 2), d(2024, 1, 5), Interval::D1).unwrap_err();
        assert_eq!(err, QueryError::EmptyTicker);
    }

    #[test]
    fn accepts_exchange_symbol_shapes() {
        for t in ["brk-b", "^GSPC", "EURUSD=X", "7203.T", "BTC-USD"] {
            assert!(Query::new(t, d(2024, 1, 2), d(2024, 1, 5), Interval::D1).is_ok(), "{t}");
        }
    }

    #[test]
    fn rejects_url_metacharacters_in_ticker() {
        for t in ["msft?x=1#", "aapl&interval=1d", "a/b", "SP Y", "%41"] {
            let err = Query::new(t, d(2024, 1, 2), d(2024, 1, 5), Interval::M15).unwrap_err();
            assert!(matches!(err, QueryError::InvalidTicker(_)), "{t}");
        }
    }

    #[test]
    fn reversed_range_is_passed_through() {
        let q = Query::new("SPY", d(2024, 2, 1), d(2024, 1, 1), Interval::D1).unwrap();
        assert!(q.end < q.start);
    }

    #[test]
    fn parse_from_form_strings() {
        let q = Query::parse("msft", "2024-01-02", "2024-01-31", "1d").unwrap();
        assert_eq!(q.ticker(), "MSFT");
        assert_eq!(q.start, d(2024, 1, 2));
        assert_eq!(q.interval, Interval::D1);
    }

    #[test]
    fn parse_reports_bad_date_field() {
        let err = Query::parse("SPY", "2024-01-02", "01/31/2024", "1d").unwrap_err();
        assert!(matches!(err, QueryError::InvalidDate { field: "end", .. }));
    }

    #[test]
    fn parse_reports_bad_interval() {
        let err = Query::parse("SPY", "2024-01-02", "2024-01-31", "3h").unwrap_err();
        assert!(matches!(err, QueryError::UnknownInterval(_)));
    }
}
