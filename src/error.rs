use crate::config::ConfigError;
use crate::dataset::error::DatasetError;
use crate::features::error::LagError;
use crate::models::error::ModelError;
use crate::report::error::ReportError;
use crate::series::error::SeriesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimaLagError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Lag(#[from] LagError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
