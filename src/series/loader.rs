use crate::series::clean::{CleanSeries, RawSeries};
use crate::series::error::SeriesError;
use crate::types::layout::StationLayout;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Reads raw station exports into a [`CleanSeries`].
#[derive(Debug, Clone)]
pub struct StationLoader {
    layout: StationLayout,
}

impl StationLoader {
    pub fn new(layout: StationLayout) -> StationLoader {
        StationLoader { layout }
    }

    pub fn layout(&self) -> &StationLayout {
        &self.layout
    }

    /// Loads and cleans a station file from disk.
    pub fn load_path(&self, path: &Path) -> Result<CleanSeries, SeriesError> {
        let bytes =
            std::fs::read(path).map_err(|e| SeriesError::SourceRead(path.to_path_buf(), e))?;
        info!("Read {} bytes from {}", bytes.len(), path.display());
        self.load_bytes(&bytes, &path.display().to_string())
    }

    /// Loads and cleans a station export held in memory. `origin` only labels errors.
    pub fn load_bytes(&self, bytes: &[u8], origin: &str) -> Result<CleanSeries, SeriesError> {
        self.parse(bytes, origin)?.clean()
    }

    /// Parses Latin-1 CSV bytes (metadata preamble, no header) into a [`RawSeries`].
    /// Every field is read as text and coerced here, so malformed numbers become
    /// absences instead of failing the read.
    pub fn parse(&self, bytes: &[u8], origin: &str) -> Result<RawSeries, SeriesError> {
        let text = decode_latin1(bytes);
        let separator = self.layout.separator();
        let expected = self.layout.columns().len();

        let mut df = CsvReadOptions::default()
            .with_has_header(false)
            .with_skip_lines(self.layout.skip_rows())
            .with_infer_schema_length(Some(0))
            .map_parse_options(|opts| opts.with_separator(separator))
            .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
            .finish()
            .map_err(|e| SeriesError::CsvRead {
                origin: origin.to_string(),
                source: e,
            })?;

        // Exports ending every line with the separator carry an empty trailing field.
        if df.width() == expected + 1 {
            let last = df
                .get_column_names()
                .last()
                .map(|n| n.to_string())
                .unwrap_or_default();
            if df.column(&last)?.null_count() == df.height() {
                df = df.drop(&last)?;
            }
        }

        if df.width() != expected {
            warn!(
                "CSV column count ({}) does not match layout length ({}) for {}",
                df.width(),
                expected,
                origin
            );
            return Err(SeriesError::SchemaMismatch {
                origin: origin.to_string(),
                expected,
                found: df.width(),
            });
        }
        if df.height() == 0 {
            return Err(SeriesError::Empty(origin.to_string()));
        }

        df.set_column_names(self.layout.columns().iter().map(String::as_str))
            .map_err(|e| SeriesError::ColumnRename {
                origin: origin.to_string(),
                source: e,
            })?;

        let first_line = self.layout.skip_rows() + 1;
        let timestamp_column = self.layout.timestamp_column();
        let timestamps = df
            .column(timestamp_column)?
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let line = first_line + row;
                let value = value.ok_or_else(|| SeriesError::MissingTimestamp {
                    origin: origin.to_string(),
                    line,
                })?;
                parse_timestamp(value).ok_or_else(|| SeriesError::UnparseableTimestamp {
                    origin: origin.to_string(),
                    line,
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut raw = RawSeries::new(timestamp_column, timestamps);
        for name in self.layout.numeric_columns() {
            let values: Vec<Option<f64>> = df
                .column(name)?
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_number))
                .collect();
            let missing = values.iter().filter(|v| v.is_none()).count();
            if missing > 0 {
                info!("Column '{}' has {} absent or unparseable values", name, missing);
            }
            raw = raw.with_column(name.as_str(), values)?;
        }

        info!("Parsed {} rows from {}", raw.len(), origin);
        Ok(raw)
    }
}

impl Default for StationLoader {
    fn default() -> Self {
        Self::new(StationLayout::default())
    }
}

/// Latin-1 maps every byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        })
}
