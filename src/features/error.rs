use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LagError {
    #[error("At least one lag offset is required")]
    NoLags,

    #[error("Lag offsets must be at least 1")]
    ZeroLag,

    #[error("At least one signal is required for lag features")]
    NoSignals,

    #[error("Signal '{0}' is not a numeric column of the series")]
    UnknownSignal(String),

    #[error("Target '{0}' is not a column of the lag table")]
    UnknownTarget(String),

    #[error("Failed building lag columns: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
