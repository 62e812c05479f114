//! Reading artifacts back, one independent result per file.
//!
//! Consumers render whatever is available: a missing file is `Ok(None)`, a
//! malformed one is an error for that artifact only.

use crate::report::error::ReportError;
use crate::report::writer::{
    COMPARISON_FILE, DERIVED_DATASET_FILE, FAILURES_FILE, IMPORTANCES_FILE, IMPROVEMENTS_FILE,
    MODEL_RESULTS_FILE,
};
use log::warn;
use polars::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ArtifactSet {
    pub dir: PathBuf,
    pub derived_dataset: Result<Option<DataFrame>, ReportError>,
    pub comparison: Result<Option<DataFrame>, ReportError>,
    pub model_results: Result<Option<DataFrame>, ReportError>,
    pub improvements: Result<Option<DataFrame>, ReportError>,
    pub failures: Result<Option<DataFrame>, ReportError>,
    pub importances: Result<Option<DataFrame>, ReportError>,
}

impl ArtifactSet {
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dir: dir.to_path_buf(),
            derived_dataset: read_artifact(&dir.join(DERIVED_DATASET_FILE)),
            comparison: read_artifact(&dir.join(COMPARISON_FILE)),
            model_results: read_artifact(&dir.join(MODEL_RESULTS_FILE)),
            improvements: read_artifact(&dir.join(IMPROVEMENTS_FILE)),
            failures: read_artifact(&dir.join(FAILURES_FILE)),
            importances: read_artifact(&dir.join(IMPORTANCES_FILE)),
        }
    }

    fn all(&self) -> [&Result<Option<DataFrame>, ReportError>; 6] {
        [
            &self.derived_dataset,
            &self.comparison,
            &self.model_results,
            &self.improvements,
            &self.failures,
            &self.importances,
        ]
    }

    /// True when every artifact was present and readable.
    pub fn is_complete(&self) -> bool {
        self.all().iter().all(|a| matches!(a, Ok(Some(_))))
    }

    /// Number of artifacts that loaded.
    pub fn available(&self) -> usize {
        self.all().iter().filter(|a| matches!(a, Ok(Some(_)))).count()
    }
}

/// Reads one CSV artifact; `Ok(None)` if the file does not exist.
pub fn read_artifact(path: &Path) -> Result<Option<DataFrame>, ReportError> {
    if !path.is_file() {
        warn!("Artifact not found: {}", path.display());
        return Ok(None);
    }
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|options| options.with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| ReportError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .finish()
        .map_err(|e| ReportError::CsvRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_files_degrade_individually() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(COMPARISON_FILE),
            "Modelo,RMSE,R2,Tipo\nSVR (Sem Lags),1.5,0.8,Sem Lag Features\n",
        )?;

        let set = ArtifactSet::load(dir.path());
        let comparison = set.comparison.as_ref().map_err(|e| e.to_string())?;
        assert_eq!(comparison.as_ref().map(DataFrame::height), Some(1));
        assert!(matches!(set.improvements, Ok(None)));
        assert!(matches!(set.derived_dataset, Ok(None)));
        assert_eq!(set.available(), 1);
        assert!(!set.is_complete());
        Ok(())
    }
}
