use crate::series::error::SeriesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("No feature columns selected")]
    NoFeatures,

    #[error("Target column '{0}' is also listed as a feature")]
    TargetIsFeature(String),

    #[error("Feature matrix has {rows} rows but the target has {target_len}")]
    ShapeMismatch { rows: usize, target_len: usize },

    #[error("Test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),

    #[error("Insufficient data: {rows} usable rows give {train} training and {test} test rows")]
    InsufficientData {
        rows: usize,
        train: usize,
        test: usize,
    },

    #[error(transparent)]
    Series(#[from] SeriesError),
}
