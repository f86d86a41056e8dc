//! Fetch → validate → derive → project.
//!
//! One call per user action. Every failure comes back as a [`PipelineError`]
//! with a ready-made [`user_message`](PipelineError::user_message); nothing
//! here is fatal to the process.

use log::{debug, info, warn};
use polars::prelude::DataFrame;
use std::fmt;
use thiserror::Error;

use crate::data::frame::frame_to_raw_bars;
use crate::data::provider::{BarRequest, MarketDataProvider, ProviderError};
use crate::data::schema::{BarSchema, SchemaError};
use crate::domain::{DerivedBar, Query};
use crate::table::{ColumnSet, Table};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("column {column} is not numeric (got {dtype})")]
    ColumnType { column: String, dtype: String },

    #[error(transparent)]
    Provider(ProviderError),
}

impl PipelineError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::NoData { ticker } => {
                format!("No data fetched for ticker {ticker}. Please check the inputs.")
            }
            PipelineError::Schema { missing } => format!(
                "Missing required columns: {}. Please check the data source.",
                missing.join(", ")
            ),
            PipelineError::ColumnType { column, dtype } => format!(
                "Column {column} has unexpected type {dtype}. Please check the data source."
            ),
            PipelineError::Provider(e) => format!("An error occurred: {e}"),
        }
    }
}

/// Non-fatal: rows with a missing required field were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataQualityWarning {
    pub dropped: usize,
    pub total: usize,
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dropped {} of {} rows with missing values.",
            self.dropped, self.total
        )
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub table: Table,
    pub warnings: Vec<DataQualityWarning>,
}

/// Run the pipeline once for `query`.
pub fn fetch_and_derive(
    provider: &dyn MarketDataProvider,
    query: &Query,
    columns: &ColumnSet,
) -> Result<FetchOutcome, PipelineError> {
    let request = BarRequest::from(query);
    info!(
        "fetching {} {} {}..{} from {}",
        request.symbol,
        request.interval,
        request.start,
        request.end,
        provider.name()
    );

    let frame = provider.fetch(&request).map_err(|e| match e {
        ProviderError::SymbolNotFound { .. } => PipelineError::NoData {
            ticker: query.ticker().to_string(),
        },
        other => PipelineError::Provider(other),
    })?;

    derive_table(frame, query, columns)
}

/// Everything after the provider call: empty check, schema and type checks,
/// null filter, derivation and projection.
pub fn derive_table(
    frame: DataFrame,
    query: &Query,
    columns: &ColumnSet,
) -> Result<FetchOutcome, PipelineError> {
    if frame.height() == 0 {
        return Err(PipelineError::NoData {
            ticker: query.ticker().to_string(),
        });
    }

    check_columns(&frame)?;

    let raw = frame_to_raw_bars(&frame)
        .map_err(|e| PipelineError::Provider(ProviderError::Frame(e.to_string())))?;
    let total = raw.len();
    let bars: Vec<DerivedBar> = raw
        .into_iter()
        .filter_map(|row| row.and_then(|r| r.into_bar()))
        .map(DerivedBar::from_bar)
        .collect();

    let mut warnings = Vec::new();
    let dropped = total - bars.len();
    if dropped > 0 {
        let warning = DataQualityWarning { dropped, total };
        warn!("{}: {warning}", query.ticker());
        warnings.push(warning);
    }

    let table = Table::new(query.ticker(), query.interval, columns, bars);
    debug!(
        "columns: {}",
        table
            .columns
            .iter()
            .map(|c| c.header())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(FetchOutcome { table, warnings })
}

fn check_columns(frame: &DataFrame) -> Result<(), PipelineError> {
    BarSchema::validate(frame).map_err(|e| match e {
        SchemaError::MissingColumns(missing) => PipelineError::Schema { missing },
        SchemaError::TypeMismatch { column, actual } => PipelineError::ColumnType {
            column,
            dtype: actual.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::StaticProvider;
    use crate::domain::Interval;
    use chrono::NaiveDate;

    struct FailingProvider(fn() -> ProviderError);

    impl MarketDataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn fetch(&self, _request: &BarRequest) -> Result<DataFrame, ProviderError> {
            Err((self.0)())
        }
    }

    fn query() -> Query {
        Query::new(
            "xyz",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            Interval::M15,
        )
        .unwrap()
    }

    #[test]
    fn symbol_not_found_is_no_data() {
        let provider = FailingProvider(|| ProviderError::SymbolNotFound {
            symbol: "XYZ".into(),
        });
        let err = fetch_and_derive(&provider, &query(), &ColumnSet::Derived).unwrap_err();
        assert_eq!(
            err.user_message(),
            "No data fetched for ticker XYZ. Please check the inputs."
        );
    }

    #[test]
    fn transport_fault_is_generic_failure() {
        let provider = FailingProvider(|| ProviderError::NetworkUnreachable("dns".into()));
        let err = fetch_and_derive(&provider, &query(), &ColumnSet::Derived).unwrap_err();
        assert!(matches!(err, PipelineError::Provider(_)));
        assert!(err.user_message().starts_with("An error occurred: "));
    }

    #[test]
    fn empty_frame_without_columns_is_no_data() {
        let provider = StaticProvider::new(DataFrame::empty());
        let err = fetch_and_derive(&provider, &query(), &ColumnSet::Plain).unwrap_err();
        assert!(matches!(err, PipelineError::NoData { ref ticker } if ticker == "XYZ"));
    }

    #[test]
    fn schema_message_lists_columns() {
        let err = PipelineError::Schema {
            missing: vec!["High".into(), "Volume".into()],
        };
        assert_eq!(
            err.user_message(),
            "Missing required columns: High, Volume. Please check the data source."
        );
    }

    #[test]
    fn warning_text() {
        let w = DataQualityWarning {
            dropped: 2,
            total: 10,
        };
        assert_eq!(w.to_string(), "Dropped 2 of 10 rows with missing values.");
    }
}
