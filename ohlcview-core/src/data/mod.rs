//! Data sources and bar-frame plumbing

pub mod csv_import;
pub mod frame;
pub mod provider;
pub mod schema;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use frame::{frame_to_raw_bars, raw_bars_to_frame, BarFrameBuilder};
pub use provider::{BarRequest, MarketDataProvider, ProviderError, RawBar, StaticProvider};
pub use schema::{BarSchema, SchemaError, REQUIRED_COLUMNS, TIMESTAMP_COLUMN};
pub use yahoo::YahooProvider;
