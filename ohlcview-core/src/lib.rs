//! OHLCView Core — domain types, market-data providers, the fetch/derive
//! pipeline, result tables and their renderers.
//!
//! - Domain types (bars, derived bars, intervals, queries)
//! - `MarketDataProvider` trait with Yahoo Finance and CSV implementations
//! - Bar-frame schema validation on polars frames
//! - `fetch_and_derive`: one fetch, null filter, derived columns, projection
//! - Text, Markdown, CSV and JSON rendering with explicit options
//! - TOML configuration

pub mod config;
pub mod data;
pub mod domain;
pub mod pipeline;
pub mod render;
pub mod table;

pub use config::{AppConfig, ConfigError};
pub use pipeline::{fetch_and_derive, DataQualityWarning, FetchOutcome, PipelineError};
pub use render::{render, OutputFormat, RenderOptions};
pub use table::{CellValue, Column, ColumnSet, Table};
