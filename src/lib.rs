mod config;
mod dataset;
mod error;
mod evaluation;
mod features;
mod models;
mod report;
mod series;
mod study;
mod types;
mod utils;

pub use config::{ConfigError, StudyConfig};
pub use error::ClimaLagError;
pub use study::*;

pub use types::classification::{PrecipitationCategory, Season};
pub use types::layout::{StationLayout, INMET_DAILY_COLUMNS, INMET_METADATA_LINES, TIMESTAMP_COLUMN};
pub use types::model_kind::ModelKind;
pub use types::variant::Variant;

pub use series::clean::{CleanSeries, ColumnFill, InterpolationReport, RawSeries};
pub use series::error::SeriesError;
pub use series::interpolate::{interpolate_time, FillStats};
pub use series::loader::StationLoader;

pub use features::annotate::{
    annotate, season_distribution, AnnotationColumns, PRECIPITATION_CATEGORY_COLUMN,
    SEASON_COLUMN, TEMPERATURE_EXTREME_COLUMN,
};
pub use features::error::LagError;
pub use features::lag::{lag_column_name, LagCorrelation, LagFrame, LagSpec};

pub use dataset::error::DatasetError;
pub use dataset::partition::{Dataset, TrainTestSplit};

pub use models::boosting::{BoostingParams, GradientBoostingRegressor};
pub use models::error::ModelError;
pub use models::forest::RandomForestRegressor;
pub use models::linear::LinearRegression;
pub use models::scaler::{Scaled, StandardScaler};
pub use models::svr::{Gamma, SvrParams, SvrRegressor, MAX_KERNEL_MATRIX_SAMPLES};
pub use models::tree::{RegressionTree, TreeParams};
pub use models::{build_regressor, Regressor};

pub use evaluation::harness::{
    EvaluationHarness, FeatureImportance, HarnessRun, ModelOutcome, ModelResult,
};
pub use evaluation::metrics::{mae, r2, rmse, Metrics};

pub use report::aggregate::{improvements, ComparisonTable, Improvement, ImprovementRecord};
pub use report::artifacts::{read_artifact, ArtifactSet};
pub use report::error::ReportError;
pub use report::writer::{
    FailureRow, COMPARISON_FILE, DERIVED_DATASET_FILE, FAILURES_FILE, IMPORTANCES_FILE,
    IMPROVEMENTS_FILE, MODEL_RESULTS_FILE,
};
