//! Domain types: bars, intervals, queries.

pub mod bar;
pub mod interval;
pub mod query;

pub use bar::{Bar, DerivedBar, VOLUME_SCALE};
pub use interval::{Interval, UnknownInterval};
pub use query::{parse_date, Query, QueryError};
