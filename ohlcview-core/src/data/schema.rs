use polars::prelude::*;

/// Name of the index column every bar frame carries.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Price/volume columns the pipeline cannot work without, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

/// Expected schema for bar frames
pub struct BarSchema;

impl BarSchema {
    /// Every required column (timestamp first, then OHLCV order) absent from the frame.
    pub fn missing_columns(df: &DataFrame) -> Vec<String> {
        let mut missing = Vec::new();
        if df.column(TIMESTAMP_COLUMN).is_err() {
            missing.push(TIMESTAMP_COLUMN.to_string());
        }
        for name in REQUIRED_COLUMNS {
            if df.column(name).is_err() {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Validate a bar frame: all columns present, all readable as numbers.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let missing = Self::missing_columns(df);
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        let ts = df
            .column(TIMESTAMP_COLUMN)
            .map_err(|_| SchemaError::MissingColumns(vec![TIMESTAMP_COLUMN.to_string()]))?;
        if !is_timestamp_dtype(ts.dtype()) {
            return Err(SchemaError::TypeMismatch {
                column: TIMESTAMP_COLUMN.to_string(),
                actual: ts.dtype().clone(),
            });
        }

        for name in REQUIRED_COLUMNS {
            let column = df
                .column(name)
                .map_err(|_| SchemaError::MissingColumns(vec![name.to_string()]))?;
            if !is_numeric_dtype(column.dtype()) {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    actual: column.dtype().clone(),
                });
            }
        }

        Ok(())
    }
}

/// Numeric dtypes a price or volume column may arrive as.
fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
            | DataType::Null
    )
}

fn is_timestamp_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Int64)
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Column {column} is not numeric (got {actual:?})")]
    TypeMismatch { column: String, actual: DataType },
}
