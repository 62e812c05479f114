//! Column layout of the INMET daily station export consumed by the loader.

/// Name of the timestamp column in every frame produced by this crate.
pub const TIMESTAMP_COLUMN: &str = "data";

/// Column order of the INMET daily export (`dados_<station>_D_<start>_<end>.csv`),
/// after the metadata preamble.
///
/// The first entry is the timestamp, the remaining ten are numeric fields.
pub const INMET_DAILY_COLUMNS: [&str; 11] = [
    TIMESTAMP_COLUMN,
    "precipitacao_total",
    "pressao_atm_media",
    "temp_orvalho_media",
    "temp_maxima",
    "temp_media",
    "temp_minima",
    "umidade_relativa_media",
    "umidade_relativa_minima",
    "umidade_relativa_maxima",
    "vento_vel_media",
];

/// Number of metadata lines preceding the data rows in an INMET export.
pub const INMET_METADATA_LINES: usize = 11;

/// Describes how a raw station file is laid out: which columns it has and how
/// many preamble lines to skip.
///
/// # Examples
///
/// ```
/// use climalag::StationLayout;
///
/// let layout = StationLayout::inmet_daily();
/// assert_eq!(layout.timestamp_column(), "data");
/// assert_eq!(layout.numeric_columns().len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationLayout {
    columns: Vec<String>,
    skip_rows: usize,
    separator: u8,
}

impl StationLayout {
    /// Builds a layout from explicit column names. The first column must be the
    /// timestamp.
    pub fn new(columns: Vec<String>, skip_rows: usize, separator: u8) -> Self {
        Self {
            columns,
            skip_rows,
            separator,
        }
    }

    /// The layout of INMET daily exports: 11 metadata lines, comma separated.
    pub fn inmet_daily() -> Self {
        Self::new(
            INMET_DAILY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            INMET_METADATA_LINES,
            b',',
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn timestamp_column(&self) -> &str {
        self.columns
            .first()
            .map(String::as_str)
            .unwrap_or(TIMESTAMP_COLUMN)
    }

    pub fn numeric_columns(&self) -> &[String] {
        self.columns.get(1..).unwrap_or(&[])
    }

    pub fn skip_rows(&self) -> usize {
        self.skip_rows
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }
}

impl Default for StationLayout {
    fn default() -> Self {
        Self::inmet_daily()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inmet_layout_has_timestamp_first() {
        let layout = StationLayout::inmet_daily();
        assert_eq!(layout.columns().len(), 11);
        assert_eq!(layout.timestamp_column(), TIMESTAMP_COLUMN);
        assert!(!layout
            .numeric_columns()
            .iter()
            .any(|c| c == TIMESTAMP_COLUMN));
        assert_eq!(layout.skip_rows(), 11);
        assert_eq!(layout.separator(), b',');
    }

    #[test]
    fn empty_layout_has_no_numeric_columns() {
        let layout = StationLayout::new(Vec::new(), 0, b';');
        assert!(layout.numeric_columns().is_empty());
        assert_eq!(layout.timestamp_column(), TIMESTAMP_COLUMN);
    }
}
