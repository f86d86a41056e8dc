//! CSV import provider.
//!
//! Reads a bar export (the shape a Yahoo/pandas download writes:
//! `Datetime,Open,High,Low,Close,Volume`, extra columns ignored) and serves
//! the rows that fall inside the requested date range.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use polars::prelude::DataFrame;

use super::frame::{whole_volume, BarFrameBuilder};
use super::provider::{BarRequest, MarketDataProvider, ProviderError};

const TIMESTAMP_HEADERS: [&str; 4] = ["datetime", "date", "timestamp", "time"];

/// Provider backed by a CSV file on disk.
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self, request: &BarRequest) -> Result<DataFrame, ProviderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| ProviderError::Io(format!("{}: {e}", self.path.display())))?;

        let headers = rdr
            .headers()
            .map_err(|e| ProviderError::Io(format!("read header: {e}")))?
            .clone();

        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        let ts_idx = TIMESTAMP_HEADERS
            .iter()
            .find_map(|h| find(h))
            .unwrap_or(0);
        let open_idx = find("Open");
        let high_idx = find("High");
        let low_idx = find("Low");
        let close_idx = find("Close");
        let volume_idx = find("Volume");

        let mut builder = BarFrameBuilder {
            open: open_idx.map(|_| Vec::new()),
            high: high_idx.map(|_| Vec::new()),
            low: low_idx.map(|_| Vec::new()),
            close: close_idx.map(|_| Vec::new()),
            volume: volume_idx.map(|_| Vec::new()),
            ..Default::default()
        };

        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| ProviderError::Io(format!("row {}: {e}", line + 2)))?;
            let raw_ts = record.get(ts_idx).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                ProviderError::ResponseFormatChanged(format!(
                    "row {}: unparseable timestamp '{raw_ts}'",
                    line + 2
                ))
            })?;

            let date = timestamp.date();
            if date < request.start || date >= request.end {
                continue;
            }

            builder.timestamps.push(timestamp);
            push_price(&mut builder.open, open_idx, &record);
            push_price(&mut builder.high, high_idx, &record);
            push_price(&mut builder.low, low_idx, &record);
            push_price(&mut builder.close, close_idx, &record);
            if let (Some(values), Some(idx)) = (builder.volume.as_mut(), volume_idx) {
                values.push(record.get(idx).and_then(parse_volume));
            }
        }

        builder.build()
    }
}

fn push_price(column: &mut Option<Vec<Option<f64>>>, idx: Option<usize>, record: &csv::StringRecord) {
    if let (Some(values), Some(idx)) = (column.as_mut(), idx) {
        values.push(record.get(idx).and_then(parse_price));
    }
}

fn is_null(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
        || cell.eq_ignore_ascii_case("none")
}

fn parse_price(cell: &str) -> Option<f64> {
    if is_null(cell) {
        return None;
    }
    cell.parse().ok()
}

/// Volume exports sometimes carry a trailing `.0`; negative values are nulls.
fn parse_volume(cell: &str) -> Option<u64> {
    if is_null(cell) {
        return None;
    }
    cell.parse::<u64>()
        .ok()
        .or_else(|| cell.parse::<f64>().ok().and_then(whole_volume))
}

fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

    for fmt in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(ts);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_local());
    }
    // pandas writes offsets as "+05:30" after a space-separated time.
    if let Ok(dt) = DateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, request: &BarRequest) -> Result<DataFrame, ProviderError> {
        debug!(
            "reading {} for {} ({} bars are not resampled)",
            self.path.display(),
            request.symbol,
            request.interval
        );
        self.read(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-03-01 09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 09:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 09:30:00-05:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T09:30:00-05:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-01"),
            Some(expected.date().and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn null_cells() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("12.5"), Some(12.5));
        assert_eq!(parse_volume("1200.0"), Some(1200));
        assert_eq!(parse_volume("-5"), None);
        assert_eq!(parse_volume("null"), None);
    }
}
