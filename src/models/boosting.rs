//! Gradient boosted regression trees on squared loss.

use crate::models::error::ModelError;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{check_feature_count, check_training_data, Regressor};
use crate::types::model_kind::ModelKind;
use log::debug;
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of rows drawn without replacement for each stage; 1.0 uses
    /// every row.
    pub subsample: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    params: BoostingParams,
    seed: u64,
    initial_prediction: f64,
    stages: Vec<RegressionTree>,
    n_features: usize,
    importances: Option<Array1<f64>>,
}

impl GradientBoostingRegressor {
    pub fn new(seed: u64) -> Self {
        Self::with_params(BoostingParams::default(), seed)
    }

    pub fn with_params(params: BoostingParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            initial_prediction: 0.0,
            stages: Vec::new(),
            n_features: 0,
            importances: None,
        }
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }

    fn stage_rows(&self, n_samples: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        if self.params.subsample >= 1.0 {
            return (0..n_samples).collect();
        }
        let size = ((n_samples as f64 * self.params.subsample).ceil() as usize).clamp(1, n_samples);
        let mut rows = index::sample(rng, n_samples, size).into_vec();
        rows.sort_unstable();
        rows
    }
}

impl Regressor for GradientBoostingRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_training_data(x, y)?;
        if !(self.params.subsample > 0.0) {
            return Err(ModelError::Numerical(format!(
                "subsample must be positive, got {}",
                self.params.subsample
            )));
        }
        let n_samples = x.nrows();
        let tree_params = TreeParams {
            max_depth: Some(self.params.max_depth),
            min_samples_leaf: self.params.min_samples_leaf,
            ..TreeParams::default()
        };

        let initial = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let mut current = Array1::from_elem(n_samples, initial);
        let mut importances = Array1::zeros(x.ncols());
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stages = Vec::with_capacity(self.params.n_estimators);

        for stage in 0..self.params.n_estimators {
            let residuals = y - &current;
            let rows = self.stage_rows(n_samples, &mut rng);
            let mut tree = RegressionTree::new(tree_params).with_seed(self.seed.wrapping_add(stage as u64));
            tree.fit_rows(x, &residuals, &rows)?;

            let update = tree.predict(x)?;
            current.scaled_add(self.params.learning_rate, &update);
            if let Some(tree_importances) = tree.feature_importances() {
                importances += tree_importances;
            }
            stages.push(tree);
        }

        let total = importances.sum();
        if total > 0.0 {
            importances /= total;
        }
        debug!(
            "Gradient boosting fitted {} stages, initial prediction {:.4}",
            stages.len(),
            initial
        );

        self.initial_prediction = initial;
        self.stages = stages;
        self.n_features = x.ncols();
        self.importances = Some(importances);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.stages.is_empty() && self.importances.is_none() {
            return Err(ModelError::NotFitted);
        }
        check_feature_count(x, self.n_features)?;
        let mut predictions = Array1::from_elem(x.nrows(), self.initial_prediction);
        for tree in &self.stages {
            predictions.scaled_add(self.params.learning_rate, &tree.predict(x)?);
        }
        Ok(predictions)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.importances.clone()
    }
}
