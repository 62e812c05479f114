//! Fits and scores the model roster on one variant's train/test split.
//!
//! A model that fails to fit, predict or score does not stop the run: its
//! [`ModelResult`] carries [`ModelOutcome::Failed`] with the reason, and the
//! remaining models are still evaluated.

use crate::dataset::partition::TrainTestSplit;
use crate::evaluation::metrics::Metrics;
use crate::models::build_regressor;
use crate::models::error::ModelError;
use crate::types::model_kind::ModelKind;
use crate::types::variant::Variant;
use log::{info, warn};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelOutcome {
    Scored(Metrics),
    /// Fit, prediction or scoring failed; metrics are unavailable.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub kind: ModelKind,
    pub variant: Variant,
    pub outcome: ModelOutcome,
}

impl ModelResult {
    pub fn scored(kind: ModelKind, variant: Variant, metrics: Metrics) -> Self {
        Self {
            kind,
            variant,
            outcome: ModelOutcome::Scored(metrics),
        }
    }

    pub fn failed(kind: ModelKind, variant: Variant, reason: impl Into<String>) -> Self {
        Self {
            kind,
            variant,
            outcome: ModelOutcome::Failed(reason.into()),
        }
    }

    /// Name as written to the `Modelo` column, e.g. `"Random Forest (Com Lags)"`.
    ///
    /// ```
    /// use climalag::{ModelKind, ModelResult, Variant};
    ///
    /// let result = ModelResult::failed(ModelKind::Svr, Variant::Baseline, "diverged");
    /// assert_eq!(result.model_name(), "SVR (Sem Lags)");
    /// ```
    pub fn model_name(&self) -> String {
        format!("{} ({})", self.kind.display_name(), self.variant.model_suffix())
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match &self.outcome {
            ModelOutcome::Scored(metrics) => Some(metrics),
            ModelOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            ModelOutcome::Scored(_) => None,
            ModelOutcome::Failed(reason) => Some(reason),
        }
    }

    pub fn is_scored(&self) -> bool {
        self.metrics().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Everything one harness pass produced for a variant.
#[derive(Debug, Clone)]
pub struct HarnessRun {
    pub variant: Variant,
    pub results: Vec<ModelResult>,
    /// Random forest importances, when that model was fitted successfully.
    pub importances: Option<Vec<FeatureImportance>>,
}

impl HarnessRun {
    pub fn scored(&self) -> impl Iterator<Item = &ModelResult> {
        self.results.iter().filter(|r| r.is_scored())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ModelResult> {
        self.results.iter().filter(|r| !r.is_scored())
    }
}

#[derive(Debug, Clone)]
pub struct EvaluationHarness {
    models: Vec<ModelKind>,
    seed: u64,
    parallel: bool,
}

impl EvaluationHarness {
    pub fn new(models: Vec<ModelKind>, seed: u64) -> Self {
        Self {
            models,
            seed,
            parallel: true,
        }
    }

    /// Fit model kinds concurrently. Results are identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn models(&self) -> &[ModelKind] {
        &self.models
    }

    pub fn evaluate(&self, variant: Variant, split: &TrainTestSplit) -> HarnessRun {
        info!(
            "Evaluating {} models on {} variant ({} train / {} test rows, {} features)",
            self.models.len(),
            variant,
            split.n_train(),
            split.n_test(),
            split.feature_names.len()
        );

        let evaluate = |&kind: &ModelKind| self.evaluate_one(kind, variant, split);
        let outputs: Vec<(ModelResult, Option<Array1<f64>>)> = if self.parallel {
            self.models.par_iter().map(evaluate).collect()
        } else {
            self.models.iter().map(evaluate).collect()
        };

        let mut importances = None;
        let mut results = Vec::with_capacity(outputs.len());
        for (result, model_importances) in outputs {
            if result.kind == ModelKind::RandomForest {
                importances = model_importances.map(|values| {
                    split
                        .feature_names
                        .iter()
                        .zip(values.iter())
                        .map(|(feature, &importance)| FeatureImportance {
                            feature: feature.clone(),
                            importance,
                        })
                        .collect()
                });
            }
            results.push(result);
        }

        HarnessRun {
            variant,
            results,
            importances,
        }
    }

    fn evaluate_one(
        &self,
        kind: ModelKind,
        variant: Variant,
        split: &TrainTestSplit,
    ) -> (ModelResult, Option<Array1<f64>>) {
        match Self::fit_and_score(kind, self.seed, split) {
            Ok((metrics, importances)) => {
                info!(
                    "{} [{}]: RMSE {:.4}, R2 {:.4}, MAE {:.4}",
                    kind, variant, metrics.rmse, metrics.r2, metrics.mae
                );
                (ModelResult::scored(kind, variant, metrics), importances)
            }
            Err(err) => {
                warn!("{} [{}] failed: {}", kind, variant, err);
                (ModelResult::failed(kind, variant, err.to_string()), None)
            }
        }
    }

    fn fit_and_score(
        kind: ModelKind,
        seed: u64,
        split: &TrainTestSplit,
    ) -> Result<(Metrics, Option<Array1<f64>>), ModelError> {
        let mut model = build_regressor(kind, seed);
        model.fit(&split.x_train, &split.y_train)?;
        let predictions = model.predict(&split.x_test)?;
        let metrics = Metrics::compute(&split.y_test, &predictions)?;
        Ok((metrics, model.feature_importances()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::partition::Dataset;
    use ndarray::{Array1, Array2};

    fn split(n: usize, target: impl Fn(usize) -> f64) -> TrainTestSplit {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                ((i * 7) % 5) as f64
            }
        });
        let y = Array1::from_iter((0..n).map(target));
        Dataset::new(x, y, vec!["t".into(), "noise".into()], "y")
            .unwrap()
            .split(0.2, 42)
            .unwrap()
    }

    #[test]
    fn scores_every_model() {
        let split = split(60, |i| 0.5 * i as f64 + ((i * 7) % 5) as f64 * 0.1);
        let run = EvaluationHarness::new(ModelKind::ALL.to_vec(), 42).evaluate(Variant::Baseline, &split);

        assert_eq!(run.results.len(), 4);
        assert_eq!(run.scored().count(), 4);
        let linear = &run.results[0];
        assert_eq!(linear.kind, ModelKind::LinearRegression);
        assert!(linear.metrics().unwrap().r2 > 0.99);

        let importances = run.importances.unwrap();
        assert_eq!(importances.len(), 2);
        assert_eq!(importances[0].feature, "t");
        assert!(importances[0].importance > importances[1].importance);
    }

    #[test]
    fn degenerate_target_fails_each_model_without_aborting() {
        let split = split(20, |_| 3.0);
        let run = EvaluationHarness::new(ModelKind::ALL.to_vec(), 1)
            .with_parallel(false)
            .evaluate(Variant::LagAugmented, &split);

        assert_eq!(run.results.len(), 4);
        assert_eq!(run.failed().count(), 4);
        for result in &run.results {
            assert_eq!(result.variant, Variant::LagAugmented);
            assert!(result.failure().unwrap().contains("constant"));
        }
        assert!(run.importances.is_none());
    }

    #[test]
    fn parallel_and_serial_runs_agree() {
        let split = split(40, |i| (i as f64).sqrt());
        let harness = EvaluationHarness::new(ModelKind::ALL.to_vec(), 9);
        let parallel = harness.clone().evaluate(Variant::Baseline, &split);
        let serial = harness.with_parallel(false).evaluate(Variant::Baseline, &split);
        assert_eq!(parallel.results, serial.results);
    }
}
