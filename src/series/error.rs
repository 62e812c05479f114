use chrono::NaiveDateTime;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Input-format failures while turning a raw station file into a clean series.
/// All of these abort a study before any modelling starts.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Failed to read station file '{0}'")]
    SourceRead(PathBuf, #[source] std::io::Error),

    #[error("Parsing error processing CSV data from '{origin}'")]
    CsvRead {
        origin: String,
        #[source]
        source: PolarsError,
    },

    #[error("CSV column count ({found}) does not match layout length ({expected}) in '{origin}'")]
    SchemaMismatch {
        origin: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to rename columns for '{origin}': {source}")]
    ColumnRename {
        origin: String,
        source: PolarsError,
    },

    #[error("No data rows found in '{0}'")]
    Empty(String),

    #[error("Missing timestamp on line {line} of '{origin}'")]
    MissingTimestamp { origin: String, line: usize },

    #[error("Unparseable timestamp '{value}' on line {line} of '{origin}'")]
    UnparseableTimestamp {
        origin: String,
        line: usize,
        value: String,
    },

    #[error("Duplicate timestamp {0} in station series")]
    DuplicateTimestamp(NaiveDateTime),

    #[error("Column '{column}' has {found} values but the series has {expected} timestamps")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Required column '{0}' not found in series")]
    MissingColumn(String),

    #[error("Timestamp {0} cannot be represented in milliseconds since the epoch")]
    TimestampOutOfRange(i64),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
