//! Yahoo Finance data provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart API at any supported interval.
//! One request per fetch: no retry, no backoff. A failed call is reported
//! once and the user decides whether to try again.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.
//! The CSV import path is the fallback when Yahoo is unavailable.

use super::frame::BarFrameBuilder;
use super::provider::{BarRequest, MarketDataProvider, ProviderError};
use crate::config::YahooConfig;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use log::{debug, warn};
use polars::prelude::DataFrame;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    exchange_timezone_name: Option<String>,
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

/// Any of the arrays may be absent; absent arrays become absent columns.
#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// How exchange timestamps are turned into wall-clock labels.
#[derive(Debug, Clone, Copy)]
enum Clock {
    Zone(Tz),
    Offset(i64),
    Utc,
}

impl Clock {
    fn from_meta(meta: Option<&ChartMeta>) -> Self {
        let Some(meta) = meta else {
            return Clock::Utc;
        };
        if let Some(tz) = meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return Clock::Zone(tz);
        }
        match meta.gmtoffset {
            Some(offset) => Clock::Offset(offset),
            None => Clock::Utc,
        }
    }

    fn local(self, ts: i64) -> Option<NaiveDateTime> {
        match self {
            Clock::Zone(tz) => DateTime::from_timestamp(ts, 0).map(|dt| dt.with_timezone(&tz).naive_local()),
            Clock::Offset(offset) => DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.naive_utc()),
            Clock::Utc => DateTime::from_timestamp(ts, 0).map(|dt| dt.naive_utc()),
        }
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl YahooProvider {
    pub fn new(config: &YahooConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))?;

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ProviderError::Other(format!("invalid base URL '{}': {e}", config.base_url)))?;

        Ok(Self { client, base_url })
    }

    /// Build the chart API URL for a request. `end` is exclusive.
    ///
    /// The symbol is one percent-encoded path segment, so `?`, `#` or `/`
    /// in it can never reach the query string.
    fn chart_url(&self, request: &BarRequest) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Other(format!("base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", request.symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("period1", &midnight_utc(request.start).to_string())
            .append_pair("period2", &midnight_utc(request.end).to_string())
            .append_pair("interval", request.interval.as_str())
            .append_pair("includePrePost", "false")
            .append_pair("events", "div,splits");
        Ok(url)
    }

    /// Parse the chart API response into a bar frame.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<DataFrame, ProviderError> {
        let result = match (resp.chart.result, resp.chart.error) {
            (_, Some(err)) if err.code == "Not Found" => {
                return Err(ProviderError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            (_, Some(err)) => {
                return Err(ProviderError::ResponseFormatChanged(format!(
                    "{}: {}",
                    err.code, err.description
                )))
            }
            (Some(result), None) => result,
            (None, None) => {
                return Err(ProviderError::ResponseFormatChanged(
                    "empty result with no error".into(),
                ))
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

        let clock = Clock::from_meta(data.meta.as_ref());

        // No timestamps: Yahoo had nothing for the range.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

        let n = timestamps.len();
        let local = timestamps
            .iter()
            .map(|&ts| {
                clock.local(ts).ok_or_else(|| {
                    ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        BarFrameBuilder {
            timestamps: local,
            open: quote.open.map(|v| pad(v, n)),
            high: quote.high.map(|v| pad(v, n)),
            low: quote.low.map(|v| pad(v, n)),
            close: quote.close.map(|v| pad(v, n)),
            volume: quote.volume.map(|v| pad(v, n)),
        }
        .build()
    }

    fn warn_if_beyond_lookback(request: &BarRequest) {
        let Some(limit) = request.interval.max_lookback_days() else {
            return;
        };
        let today = chrono::Local::now().date_naive();
        let age = (today - request.start).num_days();
        if age > limit {
            warn!(
                "{} bars are only served for the last {limit} days; start {} is {age} days ago",
                request.interval, request.start
            );
        }
    }
}

/// Yahoo occasionally sends quote arrays shorter than the timestamp array.
fn pad<T>(mut values: Vec<Option<T>>, n: usize) -> Vec<Option<T>> {
    values.resize_with(n, || None);
    values
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, request: &BarRequest) -> Result<DataFrame, ProviderError> {
        Self::warn_if_beyond_lookback(request);

        let url = self.chart_url(request)?;
        debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        // Yahoo answers unknown symbols with 404 and a JSON error body.
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                symbol: request.symbol.clone(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!(
                "failed to parse response for {}: {e}",
                request.symbol
            ))
        })?;

        let frame = Self::parse_response(&request.symbol, chart)?;
        debug!("{} returned {} rows for {}", self.name(), frame.height(), request.symbol);
        Ok(frame)
    }
}
