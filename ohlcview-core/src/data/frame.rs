//! Conversions between bar frames (polars) and `RawBar` rows.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

use super::provider::{ProviderError, RawBar};
use super::schema::TIMESTAMP_COLUMN;

/// Column-wise builder for a bar frame. Columns left as `None` are omitted
/// from the frame entirely (the source did not supply them).
#[derive(Debug, Default)]
pub struct BarFrameBuilder {
    pub timestamps: Vec<NaiveDateTime>,
    pub open: Option<Vec<Option<f64>>>,
    pub high: Option<Vec<Option<f64>>>,
    pub low: Option<Vec<Option<f64>>>,
    pub close: Option<Vec<Option<f64>>>,
    pub volume: Option<Vec<Option<u64>>>,
}

impl BarFrameBuilder {
    pub fn build(self) -> Result<DataFrame, ProviderError> {
        let n = self.timestamps.len();
        let millis: Vec<i64> = self
            .timestamps
            .iter()
            .map(|t| t.and_utc().timestamp_millis())
            .collect();

        let mut columns = vec![Column::new(TIMESTAMP_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| ProviderError::Frame(format!("timestamp cast: {e}")))?];

        let prices = [
            ("Open", self.open),
            ("High", self.high),
            ("Low", self.low),
            ("Close", self.close),
        ];
        for (name, values) in prices {
            if let Some(values) = values {
                check_len(name, values.len(), n)?;
                columns.push(Column::new(name.into(), values));
            }
        }
        if let Some(volume) = self.volume {
            check_len("Volume", volume.len(), n)?;
            columns.push(Column::new("Volume".into(), volume));
        }

        DataFrame::new(columns).map_err(|e| ProviderError::Frame(format!("dataframe creation: {e}")))
    }
}

fn check_len(name: &str, got: usize, expected: usize) -> Result<(), ProviderError> {
    if got != expected {
        return Err(ProviderError::Frame(format!(
            "column {name} has {got} values, expected {expected}"
        )));
    }
    Ok(())
}

/// Convert raw bars to a bar frame carrying all five OHLCV columns.
pub fn raw_bars_to_frame(bars: &[RawBar]) -> Result<DataFrame, ProviderError> {
    BarFrameBuilder {
        timestamps: bars.iter().map(|b| b.timestamp).collect(),
        open: Some(bars.iter().map(|b| b.open).collect()),
        high: Some(bars.iter().map(|b| b.high).collect()),
        low: Some(bars.iter().map(|b| b.low).collect()),
        close: Some(bars.iter().map(|b| b.close).collect()),
        volume: Some(bars.iter().map(|b| b.volume).collect()),
    }
    .build()
}

/// A row whose timestamp is null cannot be labelled; it is returned as `None`
/// so the caller counts it with the other malformed rows.
///
/// The frame must already have passed [`BarSchema::validate`](super::schema::BarSchema::validate).
pub fn frame_to_raw_bars(df: &DataFrame) -> PolarsResult<Vec<Option<RawBar>>> {
    let n = df.height();

    let ts_col = df.column(TIMESTAMP_COLUMN)?;
    let divisor = match ts_col.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1_000_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000,
        _ => 1,
    };
    let ts_col = ts_col.cast(&DataType::Int64)?;
    let ts_ca = ts_col.i64()?;

    let open = df.column("Open")?.cast(&DataType::Float64)?;
    let high = df.column("High")?.cast(&DataType::Float64)?;
    let low = df.column("Low")?.cast(&DataType::Float64)?;
    let close = df.column("Close")?.cast(&DataType::Float64)?;
    let volume = volume_values(df.column("Volume")?)?;

    let open_ca = open.f64()?;
    let high_ca = high.f64()?;
    let low_ca = low.f64()?;
    let close_ca = close.f64()?;

    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let timestamp = ts_ca
            .get(i)
            .and_then(|raw| DateTime::from_timestamp_millis(raw / divisor))
            .map(|dt| dt.naive_utc());

        rows.push(timestamp.map(|timestamp| RawBar {
            timestamp,
            open: open_ca.get(i),
            high: high_ca.get(i),
            low: low_ca.get(i),
            close: close_ca.get(i),
            volume: volume[i],
        }));
    }

    Ok(rows)
}

/// Integer columns cast straight to `u64` (negatives become null). Float
/// columns keep only whole, non-negative values; a fractional volume is
/// treated as missing rather than truncated.
fn volume_values(column: &Column) -> PolarsResult<Vec<Option<u64>>> {
    if column.dtype().is_float() {
        let values = column.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().map(|v| v.and_then(whole_volume)).collect())
    } else {
        let values = column.cast(&DataType::UInt64)?;
        Ok(values.u64()?.into_iter().collect())
    }
}

/// `Some` only for a finite, whole, non-negative volume.
pub(crate) fn whole_volume(v: f64) -> Option<u64> {
    (v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64).then_some(v as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::prelude::Column as FrameColumn;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn builder_omits_missing_columns() {
        let df = BarFrameBuilder {
            timestamps: vec![at(9, 30)],
            open: Some(vec![Some(1.0)]),
            close: Some(vec![Some(2.0)]),
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(df.width(), 3);
        assert!(df.column("Volume").is_err());
        assert!(df.column("Open").is_ok());
    }

    #[test]
    fn builder_rejects_ragged_columns() {
        let err = BarFrameBuilder {
            timestamps: vec![at(9, 30), at(9, 45)],
            open: Some(vec![Some(1.0)]),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(err, ProviderError::Frame(_)));
    }

    fn frame_with_volume(volume: FrameColumn) -> DataFrame {
        let n = volume.len();
        let millis: Vec<i64> = (0..n as i64).map(|i| 1_709_285_400_000 + i * 900_000).collect();
        DataFrame::new(vec![
            FrameColumn::new(TIMESTAMP_COLUMN.into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .unwrap(),
            FrameColumn::new("Open".into(), vec![1.0; n]),
            FrameColumn::new("High".into(), vec![2.0; n]),
            FrameColumn::new("Low".into(), vec![0.5; n]),
            FrameColumn::new("Close".into(), vec![1.5; n]),
            volume,
        ])
        .unwrap()
    }

    #[test]
    fn fractional_float_volume_is_missing() {
        let df = frame_with_volume(FrameColumn::new(
            "Volume".into(),
            &[15_000.7f64, 20_000.0, -3.0, f64::NAN],
        ));
        let volumes: Vec<_> = frame_to_raw_bars(&df)
            .unwrap()
            .into_iter()
            .map(|r| r.unwrap().volume)
            .collect();
        assert_eq!(volumes, vec![None, Some(20_000), None, None]);
    }

    #[test]
    fn integer_volume_casts_exactly() {
        let df = frame_with_volume(FrameColumn::new("Volume".into(), &[15_000i64, -1]));
        let rows = frame_to_raw_bars(&df).unwrap();
        assert_eq!(rows[0].unwrap().volume, Some(15_000));
        assert_eq!(rows[1].unwrap().volume, None);
    }

    #[test]
    fn whole_volume_bounds() {
        assert_eq!(whole_volume(0.0), Some(0));
        assert_eq!(whole_volume(1200.0), Some(1200));
        assert_eq!(whole_volume(0.5), None);
        assert_eq!(whole_volume(f64::INFINITY), None);
    }

    #[test]
    fn frame_rows_keep_order_and_nulls() {
        let bars = vec![
            RawBar {
                timestamp: at(9, 30),
                open: Some(1.0),
                high: Some(2.0),
                low: Some(0.5),
                close: Some(1.5),
                volume: Some(10),
            },
            RawBar {
                timestamp: at(9, 45),
                open: Some(1.5),
                high: None,
                low: Some(1.0),
                close: Some(1.2),
                volume: Some(20),
            },
        ];
        let df = raw_bars_to_frame(&bars).unwrap();
        let rows = frame_to_raw_bars(&df).unwrap();

        assert_eq!(rows.len(), 2);
        let first = rows[0].unwrap();
        let second = rows[1].unwrap();
        assert_eq!(first.timestamp, at(9, 30));
        assert_eq!(second.timestamp, at(9, 45));
        assert_eq!(second.high, None);
        assert_eq!(first.volume, Some(10));
    }
}
