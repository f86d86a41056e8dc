//! Result table: labelled derived bars projected onto a column set.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{DerivedBar, Interval};

/// Timestamp label shown in the index column, e.g. `2024-03-01 09:30 AM`.
pub const LABEL_FORMAT: &str = "%Y-%m-%d %I:%M %p";

pub fn format_label(ts: NaiveDateTime) -> String {
    ts.format(LABEL_FORMAT).to_string()
}

/// A displayable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    /// Scaled volume.
    Rv,
    Oc,
    Range,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::Volume => "Volume",
            Column::Rv => "RV",
            Column::Oc => "OC",
            Column::Range => "Range",
        }
    }

    pub fn value(self, bar: &DerivedBar) -> CellValue {
        let b = bar.bar();
        match self {
            Column::Open => CellValue::Price(b.open),
            Column::High => CellValue::Price(b.high),
            Column::Low => CellValue::Price(b.low),
            Column::Close => CellValue::Price(b.close),
            Column::Volume => CellValue::Count(b.volume),
            Column::Rv => CellValue::Price(bar.rv()),
            Column::Oc => CellValue::Price(bar.oc()),
            Column::Range => CellValue::Price(bar.range()),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnParseError {
    #[error("unknown column '{0}' (expected open, high, low, close, volume, rv, oc, range)")]
    UnknownColumn(String),

    #[error("column list is empty")]
    Empty,
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Column::Open),
            "high" => Ok(Column::High),
            "low" => Ok(Column::Low),
            "close" => Ok(Column::Close),
            "volume" => Ok(Column::Volume),
            "rv" | "scaled_volume" => Ok(Column::Rv),
            "oc" => Ok(Column::Oc),
            "range" => Ok(Column::Range),
            _ => Err(ColumnParseError::UnknownColumn(s.trim().to_string())),
        }
    }
}

/// Which columns a result table shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSet {
    /// Open, High, Low, Close, Volume.
    Plain,
    /// Open, High, Low, Close, RV, OC, Range.
    #[default]
    Derived,
    Custom(Vec<Column>),
}

const PLAIN: [Column; 5] = [
    Column::Open,
    Column::High,
    Column::Low,
    Column::Close,
    Column::Volume,
];

const DERIVED: [Column; 7] = [
    Column::Open,
    Column::High,
    Column::Low,
    Column::Close,
    Column::Rv,
    Column::Oc,
    Column::Range,
];

impl ColumnSet {
    pub fn columns(&self) -> &[Column] {
        match self {
            ColumnSet::Plain => &PLAIN,
            ColumnSet::Derived => &DERIVED,
            ColumnSet::Custom(columns) => columns,
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, ColumnSet::Derived)
    }
}

impl fmt::Display for ColumnSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSet::Plain => f.write_str("plain"),
            ColumnSet::Derived => f.write_str("derived"),
            ColumnSet::Custom(columns) => {
                let names: Vec<String> = columns
                    .iter()
                    .map(|c| c.header().to_ascii_lowercase())
                    .collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

impl FromStr for ColumnSet {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => return Ok(ColumnSet::Plain),
            "derived" => return Ok(ColumnSet::Derived),
            _ => {}
        }
        let columns = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Column>, _>>()?;
        if columns.is_empty() {
            return Err(ColumnParseError::Empty);
        }
        Ok(ColumnSet::Custom(columns))
    }
}

/// One value of a table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Price(f64),
    Count(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub bar: DerivedBar,
}

impl TableRow {
    pub fn new(bar: DerivedBar) -> Self {
        Self {
            label: format_label(bar.bar().timestamp),
            bar,
        }
    }
}

/// The pipeline's result, ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub ticker: String,
    pub interval: Interval,
    pub columns: Vec<Column>,
    /// In provider (chronological) order.
    pub rows: Vec<TableRow>,
    derived_title: bool,
}

impl Table {
    pub fn new(ticker: &str, interval: Interval, columns: &ColumnSet, bars: Vec<DerivedBar>) -> Self {
        Self {
            ticker: ticker.to_string(),
            interval,
            columns: columns.columns().to_vec(),
            rows: bars.into_iter().map(TableRow::new).collect(),
            derived_title: columns.is_derived(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` for `column`, or `None` past the last row.
    pub fn cell(&self, row: usize, column: Column) -> Option<CellValue> {
        self.rows.get(row).map(|r| column.value(&r.bar))
    }

    pub fn title(&self) -> String {
        if self.derived_title {
            format!(
                "OHLC, Scaled Volume (RV), OC, and Range for {} ({} timeframe)",
                self.ticker, self.interval
            )
        } else {
            format!("OHLCV for {} ({} timeframe)", self.ticker, self.interval)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;
    use chrono::NaiveDate;

    fn bar(h: u32, m: u32, open: f64, close: f64) -> DerivedBar {
        DerivedBar::from_bar(Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 25_000,
        })
    }

    #[test]
    fn labels_use_twelve_hour_clock() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(15, 45, 0)
            .unwrap();
        assert_eq!(format_label(ts), "2024-03-01 03:45 PM");
        assert_eq!(TableRow::new(bar(9, 30, 1.0, 2.0)).label, "2024-03-01 09:30 AM");
    }

    #[test]
    fn column_set_parsing() {
        assert_eq!("plain".parse::<ColumnSet>().unwrap(), ColumnSet::Plain);
        assert_eq!(" Derived ".parse::<ColumnSet>().unwrap(), ColumnSet::Derived);
        assert_eq!(
            "open,Close,scaled_volume".parse::<ColumnSet>().unwrap(),
            ColumnSet::Custom(vec![Column::Open, Column::Close, Column::Rv])
        );
        assert_eq!("".parse::<ColumnSet>(), Err(ColumnParseError::Empty));
        assert!(matches!(
            "open,vwap".parse::<ColumnSet>(),
            Err(ColumnParseError::UnknownColumn(c)) if c == "vwap"
        ));
    }

    #[test]
    fn column_set_display_parses_back() {
        for set in [
            ColumnSet::Plain,
            ColumnSet::Derived,
            ColumnSet::Custom(vec![Column::Range, Column::Oc]),
        ] {
            assert_eq!(set.to_string().parse::<ColumnSet>().unwrap(), set);
        }
    }

    #[test]
    fn projections() {
        assert_eq!(ColumnSet::Plain.columns().len(), 5);
        assert!(!ColumnSet::Derived.columns().contains(&Column::Volume));
        assert!(ColumnSet::Derived.columns().contains(&Column::Rv));
    }

    #[test]
    fn cells_follow_columns() {
        let table = Table::new(
            "AAPL",
            Interval::M15,
            &ColumnSet::Plain,
            vec![bar(9, 30, 10.0, 11.0)],
        );
        assert_eq!(table.cell(0, Column::Volume), Some(CellValue::Count(25_000)));
        assert_eq!(table.cell(0, Column::Oc), Some(CellValue::Price(1.0)));
        assert_eq!(table.cell(0, Column::Rv), Some(CellValue::Price(2.5)));
        assert_eq!(table.cell(1, Column::Open), None);
    }

    #[test]
    fn titles() {
        let derived = Table::new("AAPL", Interval::M15, &ColumnSet::Derived, vec![]);
        assert_eq!(
            derived.title(),
            "OHLC, Scaled Volume (RV), OC, and Range for AAPL (15m timeframe)"
        );
        let plain = Table::new("AAPL", Interval::M5, &ColumnSet::Plain, vec![]);
        assert_eq!(plain.title(), "OHLCV for AAPL (5m timeframe)");
    }
}
