//! CART regression tree on squared error, the base learner of the forest and
//! the boosting ensemble.

use crate::models::error::ModelError;
use crate::models::{check_feature_count, check_training_data};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub enum TreeNode {
    Leaf { value: f64 },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` examines all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Reduction in summed squared error.
    gain: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    params: TreeParams,
    seed: u64,
    root: Option<TreeNode>,
    n_features: usize,
    importances: Option<Array1<f64>>,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            seed: 0,
            root: None,
            n_features: 0,
            importances: None,
        }
    }

    /// Seed for feature subsampling; unused when every feature is examined.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn depth(&self) -> Option<usize> {
        self.root.as_ref().map(TreeNode::depth)
    }

    /// Fits on the rows named by `indices`. Repeated indices weigh a row more,
    /// which is how bootstrap samples are passed in.
    pub fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Result<(), ModelError> {
        if indices.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut importances = vec![0.0; self.n_features];
        let root = self.grow(x, y, indices.to_vec(), 0, &mut importances, &mut rng);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        self.root = Some(root);
        self.importances = Some(Array1::from_vec(importances));
        Ok(())
    }

    fn grow(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: Vec<usize>,
        depth: usize,
        importances: &mut [f64],
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = indices.len();
        let (sum, sum_sq) = indices
            .iter()
            .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]));
        let value = sum / n_samples as f64;
        let sse = sum_sq - sum * sum / n_samples as f64;

        let stop = n_samples < self.params.min_samples_split
            || n_samples < 2 * self.params.min_samples_leaf
            || self.params.max_depth.is_some_and(|d| depth >= d)
            || sse <= 1e-12 * sum_sq.max(1.0);
        if stop {
            return TreeNode::Leaf { value };
        }

        let features = self.candidate_features(rng);
        let Some(best) = self.best_split(x, y, &indices, sse, &features) else {
            return TreeNode::Leaf { value };
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, best.feature_idx]] <= best.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return TreeNode::Leaf { value };
        }
        importances[best.feature_idx] += best.gain;

        let left = self.grow(x, y, left_rows, depth + 1, importances, rng);
        let right = self.grow(x, y, right_rows, depth + 1, importances, rng);
        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        match self.params.max_features {
            Some(k) if k < self.n_features => {
                let mut chosen = index::sample(rng, self.n_features, k.max(1)).into_vec();
                chosen.sort_unstable();
                chosen
            }
            _ => (0..self.n_features).collect(),
        }
    }

    /// Best threshold per feature by a sorted sweep with running sums, scanned
    /// in parallel. Ties go to the lowest feature index.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_sse: f64,
        features: &[usize],
    ) -> Option<SplitCandidate> {
        let min_leaf = self.params.min_samples_leaf.max(1);
        let per_feature: Vec<Option<SplitCandidate>> = features
            .par_iter()
            .map(|&feature_idx| {
                let mut order: Vec<(f64, f64)> = indices
                    .iter()
                    .map(|&i| (x[[i, feature_idx]], y[i]))
                    .collect();
                order.sort_by(|a, b| a.0.total_cmp(&b.0));

                let n = order.len();
                let total_sum: f64 = order.iter().map(|(_, t)| t).sum();
                let total_sq: f64 = order.iter().map(|(_, t)| t * t).sum();
                let mut left_sum = 0.0;
                let mut left_sq = 0.0;
                let mut best: Option<SplitCandidate> = None;

                for pos in 1..n {
                    let (prev_x, prev_y) = order[pos - 1];
                    left_sum += prev_y;
                    left_sq += prev_y * prev_y;
                    let next_x = order[pos].0;
                    if pos < min_leaf || n - pos < min_leaf || prev_x >= next_x {
                        continue;
                    }
                    let n_left = pos as f64;
                    let n_right = (n - pos) as f64;
                    let right_sum = total_sum - left_sum;
                    let right_sq = total_sq - left_sq;
                    let child_sse = (left_sq - left_sum * left_sum / n_left)
                        + (right_sq - right_sum * right_sum / n_right);
                    let gain = parent_sse - child_sse;
                    if gain > 0.0 && best.map_or(true, |b| gain > b.gain) {
                        let mid = prev_x + (next_x - prev_x) / 2.0;
                        let threshold = if mid < next_x { mid } else { prev_x };
                        best = Some(SplitCandidate {
                            feature_idx,
                            threshold,
                            gain,
                        });
                    }
                }
                best
            })
            .collect();

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<SplitCandidate>, c| match acc {
                Some(a) if a.gain >= c.gain => Some(a),
                _ => Some(c),
            })
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_training_data(x, y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &indices)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        check_feature_count(x, self.n_features)?;
        Ok(x.outer_iter().map(|row| root.predict_row(row)).collect())
    }

    /// Impurity decrease per feature, normalized to sum to one.
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.importances.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn learns_a_step() -> Result<(), ModelError> {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0], [5.0, 0.0], [6.0, 0.0]];
        let y = array![1.0, 1.0, 1.0, 9.0, 9.0, 9.0];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y)?;

        assert_eq!(tree.depth(), Some(1));
        let predictions = tree.predict(&array![[0.0, 0.0], [3.4, 0.0], [3.6, 0.0], [100.0, 0.0]])?;
        assert_eq!(predictions.to_vec(), vec![1.0, 1.0, 9.0, 9.0]);

        let importances = tree.feature_importances().unwrap();
        assert_abs_diff_eq!(importances[0], 1.0);
        assert_abs_diff_eq!(importances[1], 0.0);
        Ok(())
    }

    #[test]
    fn depth_limit_is_respected() -> Result<(), ModelError> {
        let x = Array2::from_shape_fn((64, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| v * v);
        let mut tree = RegressionTree::new(TreeParams {
            max_depth: Some(3),
            ..TreeParams::default()
        });
        tree.fit(&x, &y)?;
        assert_eq!(tree.depth(), Some(3));
        Ok(())
    }

    #[test]
    fn unlimited_tree_interpolates_training_rows() -> Result<(), ModelError> {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| ((i * 7 + j * 3) % 11) as f64 + i as f64 * 0.01);
        let y = Array1::from_iter((0..30).map(|i| (i as f64).sin()));
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y)?;
        let predictions = tree.predict(&x)?;
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert_abs_diff_eq!(*p, *t, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn constant_target_is_a_single_leaf() -> Result<(), ModelError> {
        let x = array![[1.0], [2.0], [3.0]];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &array![4.0, 4.0, 4.0])?;
        assert_eq!(tree.depth(), Some(0));
        assert_eq!(tree.predict(&array![[10.0]])?[0], 4.0);
        Ok(())
    }
}
