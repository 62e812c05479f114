//! Lagged copies of selected signals.

use crate::features::error::LagError;
use crate::series::clean::CleanSeries;
use log::{debug, info};
use ordered_float::OrderedFloat;
use polars::prelude::{col, lit, DataFrame, DataType, Expr, IntoLazy};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// Name of the column holding `signal` shifted back by `lag` observations.
///
/// ```
/// assert_eq!(climalag::lag_column_name("temp_maxima", 7), "temp_maxima_lag_7");
/// ```
pub fn lag_column_name(signal: &str, lag: u32) -> String {
    format!("{signal}_lag_{lag}")
}

/// Which signals to lag and by how many observations.
///
/// Offsets form a set: asking for the same offset twice yields one column.
///
/// # Examples
///
/// ```
/// use climalag::LagSpec;
///
/// let spec = LagSpec::new(["temp_maxima", "vento_vel_media"], [7, 1, 3, 1]);
/// assert_eq!(spec.lags().iter().copied().collect::<Vec<_>>(), vec![1, 3, 7]);
/// assert_eq!(spec.max_lag(), Some(7));
/// assert_eq!(spec.column_names().len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagSpec {
    signals: Vec<String>,
    lags: BTreeSet<u32>,
}

impl LagSpec {
    pub fn new<S, L>(signals: S, lags: L) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        L: IntoIterator<Item = u32>,
    {
        let mut unique: Vec<String> = Vec::new();
        for signal in signals.into_iter().map(Into::into) {
            if !unique.contains(&signal) {
                unique.push(signal);
            }
        }
        Self {
            signals: unique,
            lags: lags.into_iter().collect(),
        }
    }

    pub fn signals(&self) -> &[String] {
        &self.signals
    }

    pub fn lags(&self) -> &BTreeSet<u32> {
        &self.lags
    }

    pub fn max_lag(&self) -> Option<u32> {
        self.lags.last().copied()
    }

    /// Lag column names in output order: grouped by signal, offsets ascending.
    pub fn column_names(&self) -> Vec<String> {
        self.signals
            .iter()
            .flat_map(|s| self.lags.iter().map(move |&k| lag_column_name(s, k)))
            .collect()
    }

    fn validate(&self, series: &CleanSeries) -> Result<(), LagError> {
        if self.lags.is_empty() {
            return Err(LagError::NoLags);
        }
        if self.lags.contains(&0) {
            return Err(LagError::ZeroLag);
        }
        if self.signals.is_empty() {
            return Err(LagError::NoSignals);
        }
        let numeric = series.numeric_columns();
        if let Some(unknown) = self.signals.iter().find(|s| !numeric.contains(s)) {
            return Err(LagError::UnknownSignal(unknown.clone()));
        }
        Ok(())
    }

    /// Adds every `(signal, lag)` column to a copy of the series and drops each
    /// row where any of them is undefined. The input series is not modified.
    pub fn build(&self, series: &CleanSeries) -> Result<LagFrame, LagError> {
        self.validate(series)?;

        let names = self.column_names();
        let exprs: Vec<Expr> = self
            .signals
            .iter()
            .flat_map(|s| {
                self.lags.iter().map(move |&k| {
                    col(s.as_str())
                        .shift(lit(k as i64))
                        .alias(lag_column_name(s, k))
                })
            })
            .collect();
        let defined = names
            .iter()
            .map(|n| col(n.as_str()).is_not_null())
            .reduce(|acc, e| acc.and(e))
            .ok_or(LagError::NoSignals)?;

        let mut frame = series
            .frame
            .clone()
            .lazy()
            .with_columns(exprs)
            .filter(defined)
            .collect()?;
        // One chunk per column for the CSV writer.
        frame.as_single_chunk_par();

        let dropped_rows = series.height() - frame.height();
        info!(
            "Built {} lag columns over {} signals; {} of {} rows dropped for insufficient history",
            names.len(),
            self.signals.len(),
            dropped_rows,
            series.height()
        );

        Ok(LagFrame {
            frame,
            lag_columns: names,
            dropped_rows,
        })
    }
}

/// The series extended with lag columns, restricted to rows where every lag is
/// defined.
#[derive(Debug, Clone)]
pub struct LagFrame {
    /// Timestamp, original fields, then the lag columns.
    pub frame: DataFrame,
    lag_columns: Vec<String>,
    dropped_rows: usize,
}

impl LagFrame {
    pub fn lag_columns(&self) -> &[String] {
        &self.lag_columns
    }

    /// Rows of the source series that had too little history.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Pearson correlation of every lag column with `target`, strongest positive
    /// first. Columns with no variance (or fewer than two paired rows) are left out.
    pub fn correlations(&self, target: &str) -> Result<Vec<LagCorrelation>, LagError> {
        let target_values = self
            .f64_values(target)
            .map_err(|_| LagError::UnknownTarget(target.to_string()))?;

        let mut ranked = Vec::with_capacity(self.lag_columns.len());
        for column in &self.lag_columns {
            let values = self.f64_values(column)?;
            let pairs: Vec<(f64, f64)> = values
                .iter()
                .zip(&target_values)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .collect();
            match pearson(&pairs) {
                Some(correlation) => ranked.push(LagCorrelation {
                    column: column.clone(),
                    correlation,
                }),
                None => debug!("Correlation of '{}' with '{}' is undefined", column, target),
            }
        }
        ranked.sort_by_cached_key(|c| (Reverse(OrderedFloat(c.correlation)), c.column.clone()));
        Ok(ranked)
    }

    fn f64_values(&self, column: &str) -> Result<Vec<Option<f64>>, LagError> {
        let values = self.frame.column(column)?.cast(&DataType::Float64)?;
        Ok(values.f64()?.into_iter().collect())
    }
}

/// Linear association between one lag column and the target.
#[derive(Debug, Clone, PartialEq)]
pub struct LagCorrelation {
    pub column: String,
    pub correlation: f64,
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let r = sxy / (sxx * syy).sqrt();
    r.is_finite().then_some(r)
}
