//! Bagged regression trees.

use crate::models::error::ModelError;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{check_feature_count, check_training_data, Regressor};
use crate::types::model_kind::ModelKind;
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

pub const DEFAULT_N_ESTIMATORS: usize = 100;

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    tree_params: TreeParams,
    seed: u64,
    trees: Vec<RegressionTree>,
    n_features: usize,
    importances: Option<Array1<f64>>,
}

impl RandomForestRegressor {
    /// Fully grown trees on bootstrap samples, all features examined per split.
    pub fn new(seed: u64) -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            tree_params: TreeParams::default(),
            seed,
            trees: Vec::new(),
            n_features: 0,
            importances: None,
        }
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators.max(1);
        self
    }

    pub fn with_tree_params(mut self, params: TreeParams) -> Self {
        self.tree_params = params;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForestRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_training_data(x, y)?;
        let n_samples = x.nrows();
        let base_seed = self.seed;
        let params = self.tree_params;

        // Each tree owns its generator, so the result does not depend on
        // scheduling.
        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let sample: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();
                let mut tree = RegressionTree::new(params).with_seed(seed);
                tree.fit_rows(x, y, &sample)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        let mut importances = Array1::zeros(x.ncols());
        for tree in &trees {
            if let Some(tree_importances) = tree.feature_importances() {
                importances += tree_importances;
            }
        }
        let total = importances.sum();
        if total > 0.0 {
            importances /= total;
        }

        self.n_features = x.ncols();
        self.trees = trees;
        self.importances = Some(importances);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        check_feature_count(x, self.n_features)?;
        let per_tree = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>, ModelError>>()?;

        let mut sum = Array1::zeros(x.nrows());
        for predictions in &per_tree {
            sum += predictions;
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.importances.clone()
    }
}
