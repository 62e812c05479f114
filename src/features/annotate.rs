//! Categorical annotations of the cleaned series for descriptive summaries.

use crate::series::clean::CleanSeries;
use crate::series::error::SeriesError;
use crate::types::classification::{PrecipitationCategory, Season};
use chrono::Datelike;
use polars::prelude::*;
use std::collections::BTreeMap;

pub const SEASON_COLUMN: &str = "estacao";
pub const PRECIPITATION_CATEGORY_COLUMN: &str = "categoria_precipitacao";
pub const TEMPERATURE_EXTREME_COLUMN: &str = "temp_extrema";

/// Source columns read by [`annotate`].
#[derive(Debug, Clone)]
pub struct AnnotationColumns {
    pub precipitation: String,
    pub max_temperature: String,
    pub min_temperature: String,
}

impl Default for AnnotationColumns {
    fn default() -> Self {
        Self {
            precipitation: "precipitacao_total".to_string(),
            max_temperature: "temp_maxima".to_string(),
            min_temperature: "temp_minima".to_string(),
        }
    }
}

/// Returns a copy of the series with season, precipitation category and a
/// temperature-extreme flag appended.
///
/// A day is extreme when its maximum is above the 95th percentile of all maxima
/// or its minimum is below the 5th percentile of all minima.
pub fn annotate(series: &CleanSeries, columns: &AnnotationColumns) -> Result<DataFrame, SeriesError> {
    let seasons: Vec<Option<&str>> = series
        .timestamps()?
        .iter()
        .map(|t| Season::from_month(t.month()).map(|s| s.label()))
        .collect();

    let categories: Vec<Option<&str>> = series
        .values(&columns.precipitation)?
        .into_iter()
        .map(|v| v.and_then(PrecipitationCategory::from_mm).map(|c| c.label()))
        .collect();

    let max_temp = series.values(&columns.max_temperature)?;
    let min_temp = series.values(&columns.min_temperature)?;
    let hot = quantile(&max_temp, 0.95);
    let cold = quantile(&min_temp, 0.05);
    let extreme: Vec<bool> = max_temp
        .iter()
        .zip(&min_temp)
        .map(|(hi, lo)| {
            let above = matches!((hi, hot), (Some(v), Some(q)) if *v > q);
            let below = matches!((lo, cold), (Some(v), Some(q)) if *v < q);
            above || below
        })
        .collect();

    let mut frame = series.frame.clone();
    frame.with_column(Series::new(SEASON_COLUMN.into(), seasons))?;
    frame.with_column(Series::new(PRECIPITATION_CATEGORY_COLUMN.into(), categories))?;
    frame.with_column(Series::new(TEMPERATURE_EXTREME_COLUMN.into(), extreme))?;
    Ok(frame)
}

/// Number of observations falling in each season.
pub fn season_distribution(series: &CleanSeries) -> Result<BTreeMap<Season, usize>, SeriesError> {
    let mut counts = BTreeMap::new();
    for t in series.timestamps()? {
        if let Some(season) = Season::from_month(t.month()) {
            *counts.entry(season).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

/// Linear-interpolated quantile of the present values.
fn quantile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.total_cmp(b));
    let pos = q * (present.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(present[lower] + (present[upper] - present[lower]) * frac)
}
