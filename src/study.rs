//! The end-to-end lag-feature study: load, clean, build lags, split, evaluate
//! both variants and aggregate.

use crate::config::StudyConfig;
use crate::dataset::error::DatasetError;
use crate::dataset::partition::Dataset;
use crate::error::ClimaLagError;
use crate::evaluation::harness::{EvaluationHarness, FeatureImportance, HarnessRun, ModelResult};
use crate::features::lag::LagFrame;
use crate::report::aggregate::{improvements, ComparisonTable, ImprovementRecord};
use crate::report::error::ReportError;
use crate::report::writer::{
    comparison_frame, datetime_format, failures_frame, importances_frame, improvements_frame,
    model_results_frame, write_csv, FailureRow, COMPARISON_FILE, DERIVED_DATASET_FILE,
    FAILURES_FILE, IMPORTANCES_FILE, IMPROVEMENTS_FILE, MODEL_RESULTS_FILE,
};
use crate::series::clean::CleanSeries;
use crate::series::loader::StationLoader;
use crate::types::variant::Variant;
use crate::utils::ensure_output_dir_exists;
use bon::bon;
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::Path;

/// Runs lag-feature studies with a fixed configuration.
///
/// # Examples
///
/// ```no_run
/// use climalag::{ClimaLagError, LagStudy, StudyConfig};
/// use std::path::Path;
///
/// # fn main() -> Result<(), ClimaLagError> {
/// let study = LagStudy::new(StudyConfig::default())?;
/// let report = study
///     .run()
///     .path(Path::new("dados_A771_D_2020-01-01_2024-12-31.csv"))
///     .output_dir(Path::new("resultados"))
///     .call()?;
///
/// if let Some(best) = report.comparison().best() {
///     println!("Best model: {}", best.model_name());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LagStudy {
    config: StudyConfig,
    loader: StationLoader,
}

#[bon]
impl LagStudy {
    /// Validates `config` and prepares a loader for its layout.
    pub fn new(config: StudyConfig) -> Result<Self, ClimaLagError> {
        config.validate()?;
        let loader = StationLoader::new(config.layout());
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Runs the study on a station file.
    ///
    /// # Arguments
    ///
    /// * `.path(&Path)`: **Required.** The raw station export.
    /// * `.output_dir(&Path)`: Optional. When set, every artifact is written there
    ///   after the run.
    ///
    /// # Errors
    ///
    /// Input-format problems ([`ClimaLagError::Series`]) and invalid lag settings
    /// abort the run. A variant without enough rows does not: it is recorded in
    /// the report and the other variant still runs.
    #[builder]
    pub fn run(&self, path: &Path, output_dir: Option<&Path>) -> Result<StudyReport, ClimaLagError> {
        let series = self.loader.load_path(path)?;
        let report = self.run_series(series)?;
        if let Some(dir) = output_dir {
            report.write_artifacts(dir)?;
        }
        Ok(report)
    }

    /// Runs the study on an already cleaned series.
    pub fn run_series(&self, series: CleanSeries) -> Result<StudyReport, ClimaLagError> {
        let lag_frame = self.config.lag_spec().build(&series)?;
        let harness = EvaluationHarness::new(self.config.models.clone(), self.config.seed)
            .with_parallel(self.config.parallel);

        let baseline_features = self.config.baseline_features.clone();
        let mut lag_features = baseline_features.clone();
        lag_features.extend(lag_frame.lag_columns().iter().cloned());

        let baseline = self.run_variant(
            &harness,
            Variant::Baseline,
            &series.frame,
            &baseline_features,
        );
        let lag_augmented = self.run_variant(
            &harness,
            Variant::LagAugmented,
            &lag_frame.frame,
            &lag_features,
        );

        // A variant that could not be split still lists every roster model, as failed.
        let results: Vec<ModelResult> = [&baseline, &lag_augmented]
            .into_iter()
            .zip(Variant::BOTH)
            .flat_map(|(outcome, variant)| match outcome {
                Ok(run) => run.harness.results.clone(),
                Err(err) => self
                    .config
                    .models
                    .iter()
                    .map(|&kind| ModelResult::failed(kind, variant, err.to_string()))
                    .collect(),
            })
            .collect();
        let comparison = ComparisonTable::rank(&results);
        let improvements = improvements(&results);

        info!(
            "Study finished: {} scored, {} failed, {} improvement records",
            comparison.scored().count(),
            comparison.failed().count(),
            improvements.len()
        );

        Ok(StudyReport {
            series,
            lag_frame,
            baseline,
            lag_augmented,
            comparison,
            improvements,
        })
    }

    fn run_variant(
        &self,
        harness: &EvaluationHarness,
        variant: Variant,
        frame: &DataFrame,
        features: &[String],
    ) -> Result<VariantRun, DatasetError> {
        let outcome = Dataset::from_frame(frame, features, &self.config.target)
            .and_then(|data| {
                let split = data.split(self.config.test_fraction, self.config.seed)?;
                Ok((data.n_rows(), split))
            });
        match outcome {
            Ok((n_rows, split)) => Ok(VariantRun {
                variant,
                n_rows,
                n_train: split.n_train(),
                n_test: split.n_test(),
                features: features.to_vec(),
                harness: harness.evaluate(variant, &split),
            }),
            Err(err) => {
                warn!("Variant {} skipped: {}", variant, err);
                Err(err)
            }
        }
    }
}

/// One variant's dataset sizes and model results.
#[derive(Debug, Clone)]
pub struct VariantRun {
    pub variant: Variant,
    /// Usable rows before the split.
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub features: Vec<String>,
    pub harness: HarnessRun,
}

/// Immutable result of a study run.
#[derive(Debug)]
pub struct StudyReport {
    series: CleanSeries,
    lag_frame: LagFrame,
    baseline: Result<VariantRun, DatasetError>,
    lag_augmented: Result<VariantRun, DatasetError>,
    comparison: ComparisonTable,
    improvements: Vec<ImprovementRecord>,
}

impl StudyReport {
    pub fn series(&self) -> &CleanSeries {
        &self.series
    }

    pub fn lag_frame(&self) -> &LagFrame {
        &self.lag_frame
    }

    pub fn variant(&self, variant: Variant) -> &Result<VariantRun, DatasetError> {
        match variant {
            Variant::Baseline => &self.baseline,
            Variant::LagAugmented => &self.lag_augmented,
        }
    }

    pub fn comparison(&self) -> &ComparisonTable {
        &self.comparison
    }

    pub fn improvements(&self) -> &[ImprovementRecord] {
        &self.improvements
    }

    /// Every (model, variant) pair without metrics, including every model of a
    /// variant that could not be split.
    pub fn failures(&self) -> Vec<FailureRow> {
        self.comparison.failed().map(FailureRow::from).collect()
    }

    pub fn importances(&self, variant: Variant) -> Option<&[FeatureImportance]> {
        self.variant(variant)
            .as_ref()
            .ok()
            .and_then(|run| run.harness.importances.as_deref())
    }

    /// Writes the derived dataset, the comparison and per-model metric tables,
    /// and the improvement, failure and importance tables into `dir`, creating
    /// it if needed.
    pub fn write_artifacts(&self, dir: &Path) -> Result<(), ReportError> {
        ensure_output_dir_exists(dir)?;

        let mut derived = self.lag_frame.frame.clone();
        let format = datetime_format(&derived, self.series.timestamp_column())?;
        write_csv(&mut derived, &dir.join(DERIVED_DATASET_FILE), Some(format))?;

        write_csv(
            &mut comparison_frame(&self.comparison)?,
            &dir.join(COMPARISON_FILE),
            None,
        )?;
        write_csv(
            &mut model_results_frame(&self.comparison)?,
            &dir.join(MODEL_RESULTS_FILE),
            None,
        )?;
        write_csv(
            &mut improvements_frame(&self.improvements)?,
            &dir.join(IMPROVEMENTS_FILE),
            None,
        )?;
        write_csv(
            &mut failures_frame(&self.failures())?,
            &dir.join(FAILURES_FILE),
            None,
        )?;

        let per_variant: Vec<(Variant, &[FeatureImportance])> = Variant::BOTH
            .into_iter()
            .filter_map(|v| self.importances(v).map(|i| (v, i)))
            .collect();
        write_csv(
            &mut importances_frame(&per_variant)?,
            &dir.join(IMPORTANCES_FILE),
            None,
        )?;

        info!("Wrote study artifacts to {}", dir.display());
        Ok(())
    }
}
