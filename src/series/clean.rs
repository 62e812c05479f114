//! The cleaned, time-ordered station series and the raw form it is built from.

use crate::series::error::SeriesError;
use crate::series::interpolate::{interpolate_time, FillStats};
use chrono::{DateTime, NaiveDateTime};
use log::{debug, info, warn};
use polars::prelude::*;

/// Per-column interpolation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnFill {
    pub column: String,
    pub stats: FillStats,
}

/// What interpolation did to each numeric column of a series.
///
/// Absences at the very start or end of a column have nothing to interpolate
/// towards; they survive cleaning and are listed here so callers can decide how
/// to treat them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterpolationReport {
    columns: Vec<ColumnFill>,
}

impl InterpolationReport {
    pub fn columns(&self) -> &[ColumnFill] {
        &self.columns
    }

    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.stats.filled).sum()
    }

    /// Columns that still contain boundary absences.
    pub fn unresolved(&self) -> impl Iterator<Item = &ColumnFill> {
        self.columns.iter().filter(|c| c.stats.unresolved() > 0)
    }

    /// `true` when no column contains an absence after cleaning.
    pub fn is_complete(&self) -> bool {
        self.unresolved().next().is_none()
    }

    pub fn get(&self, column: &str) -> Option<&FillStats> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.stats)
    }
}

/// Station observations as parsed, before ordering and interpolation.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use climalag::RawSeries;
///
/// # fn main() -> Result<(), climalag::SeriesError> {
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let clean = RawSeries::new("data", vec![day(3), day(1), day(2)])
///     .with_column("temp_media", vec![Some(3.0), Some(1.0), None])?
///     .clean()?;
///
/// assert_eq!(clean.values("temp_media")?, vec![Some(1.0), Some(2.0), Some(3.0)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RawSeries {
    timestamp_column: String,
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl RawSeries {
    pub fn new(timestamp_column: impl Into<String>, timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamp_column: timestamp_column.into(),
            timestamps,
            columns: Vec::new(),
        }
    }

    /// Adds a numeric column. Its length must match the number of timestamps.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, SeriesError> {
        let name = name.into();
        if values.len() != self.timestamps.len() {
            return Err(SeriesError::LengthMismatch {
                column: name,
                expected: self.timestamps.len(),
                found: values.len(),
            });
        }
        self.columns.push((name, values));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Orders the rows by time, rejects duplicate timestamps and fills interior
    /// absences by time-weighted linear interpolation.
    pub fn clean(self) -> Result<CleanSeries, SeriesError> {
        let mut order: Vec<usize> = (0..self.timestamps.len()).collect();
        order.sort_by_key(|&i| self.timestamps[i]);

        if let Some(pair) = order
            .windows(2)
            .find(|w| self.timestamps[w[0]] == self.timestamps[w[1]])
        {
            return Err(SeriesError::DuplicateTimestamp(self.timestamps[pair[0]]));
        }

        let millis: Vec<i64> = order
            .iter()
            .map(|&i| self.timestamps[i].and_utc().timestamp_millis())
            .collect();

        let mut series = Vec::with_capacity(self.columns.len() + 1);
        series.push(
            Series::new(self.timestamp_column.as_str().into(), millis.clone())
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?,
        );

        let mut report = InterpolationReport::default();
        for (name, values) in &self.columns {
            let ordered: Vec<Option<f64>> = order.iter().map(|&i| values[i]).collect();
            let (filled, stats) = interpolate_time(&millis, &ordered);
            if stats.unresolved() > 0 {
                warn!(
                    "Column '{}' keeps {} leading and {} trailing absences with no interpolation anchor",
                    name, stats.leading_unresolved, stats.trailing_unresolved
                );
            }
            debug!("Column '{}': interpolated {} values", name, stats.filled);
            report.columns.push(ColumnFill {
                column: name.clone(),
                stats,
            });
            series.push(Series::new(name.as_str().into(), filled));
        }

        let frame = DataFrame::new(series.into_iter().map(Column::from).collect())?;
        info!(
            "Cleaned series: {} rows, {} numeric columns, {} values interpolated",
            frame.height(),
            self.columns.len(),
            report.total_filled()
        );

        Ok(CleanSeries {
            frame,
            timestamp_column: self.timestamp_column,
            report,
        })
    }
}

/// A time-ordered series with one row per timestamp and interior absences filled.
///
/// The wrapped [`DataFrame`] holds the timestamp column as
/// `Datetime(Milliseconds)` followed by the numeric columns as `Float64`.
#[derive(Debug, Clone)]
pub struct CleanSeries {
    /// The underlying frame.
    pub frame: DataFrame,
    timestamp_column: String,
    report: InterpolationReport,
}

impl CleanSeries {
    pub fn report(&self) -> &InterpolationReport {
        &self.report
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Names of every column except the timestamp.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .filter(|n| n != &self.timestamp_column)
            .collect()
    }

    /// Values of one numeric column, in time order.
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>, SeriesError> {
        column_values(&self.frame, column)
    }

    /// Timestamps in ascending order.
    pub fn timestamps(&self) -> Result<Vec<NaiveDateTime>, SeriesError> {
        frame_timestamps(&self.frame, &self.timestamp_column)
    }
}

/// Reads a column as `f64` values, casting integer columns if needed.
pub(crate) fn column_values(frame: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, SeriesError> {
    let col = frame
        .column(column)
        .map_err(|_| SeriesError::MissingColumn(column.to_string()))?
        .cast(&DataType::Float64)?;
    Ok(col.f64()?.into_iter().collect())
}

pub(crate) fn frame_timestamps(
    frame: &DataFrame,
    column: &str,
) -> Result<Vec<NaiveDateTime>, SeriesError> {
    let col = frame
        .column(column)
        .map_err(|_| SeriesError::MissingColumn(column.to_string()))?
        .cast(&DataType::Int64)?;
    col.i64()?
        .into_iter()
        .enumerate()
        .map(|(row, ms)| {
            let ms = ms.ok_or_else(|| SeriesError::MissingColumn(format!("{column}[{row}]")))?;
            DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.naive_utc())
                .ok_or(SeriesError::TimestampOutOfRange(ms))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn days(n: usize) -> Vec<NaiveDateTime> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn clean_sorts_by_time() -> Result<(), Box<dyn std::error::Error>> {
        let mut stamps = days(4);
        stamps.reverse();
        let clean = RawSeries::new("data", stamps)
            .with_column("x", vec![Some(4.0), Some(3.0), Some(2.0), Some(1.0)])?
            .clean()?;

        let times = clean.timestamps()?;
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            clean.values("x")?,
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]
        );
        Ok(())
    }

    #[test]
    fn duplicate_timestamps_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let mut stamps = days(3);
        stamps[2] = stamps[0];
        let result = RawSeries::new("data", stamps)
            .with_column("x", vec![Some(1.0), Some(2.0), Some(3.0)])?
            .clean();

        assert!(matches!(result, Err(SeriesError::DuplicateTimestamp(_))));
        Ok(())
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let result = RawSeries::new("data", days(3)).with_column("x", vec![Some(1.0)]);
        assert!(matches!(
            result,
            Err(SeriesError::LengthMismatch {
                expected: 3,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn no_interior_absences_survive() -> Result<(), Box<dyn std::error::Error>> {
        let clean = RawSeries::new("data", days(6))
            .with_column(
                "x",
                vec![None, Some(1.0), None, None, Some(4.0), None],
            )?
            .with_column("y", vec![Some(0.0); 6])?
            .clean()?;

        let x = clean.values("x")?;
        assert!(x[1..5].iter().all(Option::is_some));
        assert_eq!(x[0], None);
        assert_eq!(x[5], None);

        let report = clean.report();
        assert!(!report.is_complete());
        assert_eq!(report.unresolved().count(), 1);
        assert_eq!(report.get("x").map(|s| s.filled), Some(2));
        assert_eq!(report.get("y").map(|s| s.unresolved()), Some(0));
        assert_eq!(clean.numeric_columns(), vec!["x", "y"]);
        Ok(())
    }
}
