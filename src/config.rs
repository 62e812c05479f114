//! Study settings, loadable from JSON. Every field has a default matching the
//! INMET daily export and the reference comparison.

use crate::features::lag::LagSpec;
use crate::types::layout::{StationLayout, INMET_DAILY_COLUMNS, INMET_METADATA_LINES};
use crate::types::model_kind::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidTestFraction(f64),

    #[error("Separator must be a single-byte character, got '{0}'")]
    InvalidSeparator(char),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Metadata lines before the data rows.
    pub skip_rows: usize,
    pub separator: char,
    /// Source columns in file order, timestamp first.
    pub columns: Vec<String>,
    pub lag_signals: Vec<String>,
    pub lags: Vec<u32>,
    /// Predictors shared by both variants.
    pub baseline_features: Vec<String>,
    pub target: String,
    pub test_fraction: f64,
    pub seed: u64,
    /// Fit model kinds concurrently.
    pub parallel: bool,
    pub models: Vec<ModelKind>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            skip_rows: INMET_METADATA_LINES,
            separator: ',',
            columns: INMET_DAILY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            lag_signals: [
                "temp_maxima",
                "pressao_atm_media",
                "temp_orvalho_media",
                "umidade_relativa_media",
                "vento_vel_media",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            lags: vec![1, 2, 3, 7],
            baseline_features: [
                "temp_minima",
                "temp_maxima",
                "umidade_relativa_media",
                "pressao_atm_media",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            target: "temp_media".to_string(),
            test_fraction: 0.2,
            seed: 42,
            parallel: true,
            models: ModelKind::ALL.to_vec(),
        }
    }
}

impl StudyConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    ///
    /// The result is validated before it is returned.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config: StudyConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::InvalidTestFraction(self.test_fraction));
        }
        if !self.separator.is_ascii() {
            return Err(ConfigError::InvalidSeparator(self.separator));
        }
        if self.columns.len() < 2 {
            return Err(ConfigError::Invalid(
                "layout needs a timestamp and at least one numeric column".to_string(),
            ));
        }
        if self.lags.is_empty() {
            return Err(ConfigError::Invalid("no lag offsets".to_string()));
        }
        if self.lags.contains(&0) {
            return Err(ConfigError::Invalid("lag offsets must be at least 1".to_string()));
        }
        if self.lag_signals.is_empty() {
            return Err(ConfigError::Invalid("no lag signals".to_string()));
        }
        if self.baseline_features.is_empty() {
            return Err(ConfigError::Invalid("no baseline features".to_string()));
        }
        if self.baseline_features.contains(&self.target) {
            return Err(ConfigError::Invalid(format!(
                "target '{}' is also a baseline feature",
                self.target
            )));
        }
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("no models selected".to_string()));
        }
        let numeric = &self.columns[1..];
        for name in self
            .baseline_features
            .iter()
            .chain(&self.lag_signals)
            .chain(std::iter::once(&self.target))
        {
            if !numeric.contains(name) {
                return Err(ConfigError::Invalid(format!(
                    "'{}' is not a numeric column of the layout",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn layout(&self) -> StationLayout {
        StationLayout::new(self.columns.clone(), self.skip_rows, self.separator as u8)
    }

    pub fn lag_spec(&self) -> LagSpec {
        LagSpec::new(self.lag_signals.iter().cloned(), self.lags.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let config = StudyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout(), StationLayout::inmet_daily());
        assert_eq!(config.lag_spec().column_names().len(), 20);
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        write!(file, r#"{{"test_fraction": 0.25, "seed": 7, "models": ["svr"]}}"#)?;
        let config = StudyConfig::from_json_file(file.path())?;
        assert_eq!(config.test_fraction, 0.25);
        assert_eq!(config.seed, 7);
        assert_eq!(config.models, vec![ModelKind::Svr]);
        assert_eq!(config.lags, vec![1, 2, 3, 7]);
        Ok(())
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_fraction = StudyConfig {
            test_fraction: 1.0,
            ..StudyConfig::default()
        };
        assert!(matches!(
            bad_fraction.validate(),
            Err(ConfigError::InvalidTestFraction(_))
        ));

        let target_as_feature = StudyConfig {
            baseline_features: vec!["temp_media".to_string()],
            ..StudyConfig::default()
        };
        assert!(matches!(target_as_feature.validate(), Err(ConfigError::Invalid(_))));

        let zero_lag = StudyConfig {
            lags: vec![0, 1],
            ..StudyConfig::default()
        };
        assert!(matches!(zero_lag.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = StudyConfig::from_json_file("/nonexistent/climalag.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/climalag.json"));
    }
}
