//! Tabular artifacts consumed by the dashboards.
//!
//! Column names and file names are part of the external contract and must not
//! change.

use crate::evaluation::harness::{FeatureImportance, ModelResult};
use crate::evaluation::metrics::Metrics;
use crate::report::aggregate::{ComparisonTable, ImprovementRecord};
use crate::report::error::ReportError;
use crate::series::clean::frame_timestamps;
use crate::types::variant::Variant;
use chrono::Timelike;
use log::debug;
use ordered_float::OrderedFloat;
use polars::prelude::*;
use std::cmp::Reverse;
use std::fs::File;
use std::path::Path;

pub const DERIVED_DATASET_FILE: &str = "dados_climaticos_com_lags.csv";
pub const COMPARISON_FILE: &str = "comparacao_lag_features_completa.csv";
pub const IMPROVEMENTS_FILE: &str = "melhorias_lag_features.csv";
pub const FAILURES_FILE: &str = "falhas_modelos.csv";
pub const IMPORTANCES_FILE: &str = "importancia_features.csv";
pub const MODEL_RESULTS_FILE: &str = "model_comparison_results.csv";

pub const MODEL_COLUMN: &str = "Modelo";
pub const RMSE_COLUMN: &str = "RMSE";
pub const MAE_COLUMN: &str = "MAE";
pub const R2_COLUMN: &str = "R2";
pub const VARIANT_COLUMN: &str = "Tipo";
pub const RMSE_IMPROVEMENT_COLUMN: &str = "Melhoria_RMSE_%";
pub const R2_IMPROVEMENT_COLUMN: &str = "Melhoria_R2_%";
pub const ERROR_COLUMN: &str = "Erro";
pub const FEATURE_COLUMN: &str = "Feature";
pub const IMPORTANCE_COLUMN: &str = "Importancia";

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A (model, variant) pair that produced no metrics, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRow {
    pub model: String,
    pub variant: Variant,
    pub reason: String,
}

impl From<&ModelResult> for FailureRow {
    fn from(result: &ModelResult) -> Self {
        Self {
            model: result.model_name(),
            variant: result.variant,
            reason: result.failure().unwrap_or_default().to_string(),
        }
    }
}

/// `Modelo, RMSE, R2, Tipo` in ranked order; failed rows have empty metrics.
pub fn comparison_frame(table: &ComparisonTable) -> PolarsResult<DataFrame> {
    let rows = table.rows();
    let names: Vec<String> = rows.iter().map(ModelResult::model_name).collect();
    let rmse: Vec<Option<f64>> = rows.iter().map(|r| r.metrics().map(|m| m.rmse)).collect();
    let r2: Vec<Option<f64>> = rows.iter().map(|r| r.metrics().map(|m| m.r2)).collect();
    let kinds: Vec<&str> = rows.iter().map(|r| r.variant.label()).collect();

    DataFrame::new(vec![
        Column::new(MODEL_COLUMN.into(), names),
        Column::new(RMSE_COLUMN.into(), rmse),
        Column::new(R2_COLUMN.into(), r2),
        Column::new(VARIANT_COLUMN.into(), kinds),
    ])
}

/// `Modelo, RMSE, MAE, R2, Tipo` per (model, variant) pair, in ranked order.
pub fn model_results_frame(table: &ComparisonTable) -> PolarsResult<DataFrame> {
    let rows = table.rows();
    let names: Vec<String> = rows.iter().map(ModelResult::model_name).collect();
    let metric = |f: fn(&Metrics) -> f64| -> Vec<Option<f64>> {
        rows.iter().map(|r| r.metrics().map(f)).collect()
    };
    let kinds: Vec<&str> = rows.iter().map(|r| r.variant.label()).collect();

    DataFrame::new(vec![
        Column::new(MODEL_COLUMN.into(), names),
        Column::new(RMSE_COLUMN.into(), metric(|m| m.rmse)),
        Column::new(MAE_COLUMN.into(), metric(|m| m.mae)),
        Column::new(R2_COLUMN.into(), metric(|m| m.r2)),
        Column::new(VARIANT_COLUMN.into(), kinds),
    ])
}

/// `Modelo, Melhoria_RMSE_%, Melhoria_R2_%`; undefined values are nulls.
pub fn improvements_frame(records: &[ImprovementRecord]) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = records.iter().map(ImprovementRecord::model_name).collect();
    let rmse: Vec<Option<f64>> = records.iter().map(|r| r.rmse.value()).collect();
    let r2: Vec<Option<f64>> = records.iter().map(|r| r.r2.value()).collect();

    DataFrame::new(vec![
        Column::new(MODEL_COLUMN.into(), names),
        Column::new(RMSE_IMPROVEMENT_COLUMN.into(), rmse),
        Column::new(R2_IMPROVEMENT_COLUMN.into(), r2),
    ])
}

pub fn failures_frame(rows: &[FailureRow]) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = rows.iter().map(|r| r.model.as_str()).collect();
    let kinds: Vec<&str> = rows.iter().map(|r| r.variant.label()).collect();
    let reasons: Vec<&str> = rows.iter().map(|r| r.reason.as_str()).collect();

    DataFrame::new(vec![
        Column::new(MODEL_COLUMN.into(), names),
        Column::new(VARIANT_COLUMN.into(), kinds),
        Column::new(ERROR_COLUMN.into(), reasons),
    ])
}

/// `Feature, Importancia, Tipo`, most important first within each variant.
pub fn importances_frame(per_variant: &[(Variant, &[FeatureImportance])]) -> PolarsResult<DataFrame> {
    let mut features = Vec::new();
    let mut values = Vec::new();
    let mut kinds = Vec::new();
    for (variant, importances) in per_variant {
        let mut ranked: Vec<&FeatureImportance> = importances.iter().collect();
        ranked.sort_by_key(|i| Reverse(OrderedFloat(i.importance)));
        for importance in ranked {
            features.push(importance.feature.as_str());
            values.push(importance.importance);
            kinds.push(variant.label());
        }
    }

    DataFrame::new(vec![
        Column::new(FEATURE_COLUMN.into(), features),
        Column::new(IMPORTANCE_COLUMN.into(), values),
        Column::new(VARIANT_COLUMN.into(), kinds),
    ])
}

/// Date-only output when every timestamp falls on midnight.
pub(crate) fn datetime_format(frame: &DataFrame, timestamp_column: &str) -> Result<&'static str, ReportError> {
    let all_midnight = frame_timestamps(frame, timestamp_column)?
        .iter()
        .all(|t| t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0);
    Ok(if all_midnight { DATE_FORMAT } else { DATETIME_FORMAT })
}

pub fn write_csv(
    frame: &mut DataFrame,
    path: &Path,
    datetime_format: Option<&str>,
) -> Result<(), ReportError> {
    let mut file = File::create(path).map_err(|e| ReportError::FileCreate(path.to_path_buf(), e))?;
    frame.as_single_chunk_par();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(datetime_format.map(str::to_string))
        .finish(frame)
        .map_err(|e| ReportError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!("Wrote {} rows to {}", frame.height(), path.display());
    Ok(())
}
