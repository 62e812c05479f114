use crate::series::error::SeriesError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Output path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to create output directory '{0}'")]
    OutputDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to create artifact file '{0}'")]
    FileCreate(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV artifact '{path}'")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to read CSV artifact '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("DataFrame processing error: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
