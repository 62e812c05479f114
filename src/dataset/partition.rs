//! Feature/target matrices and their reproducible train/test partition.

use crate::dataset::error::DatasetError;
use crate::series::clean::column_values;
use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::DataFrame;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A feature matrix with its target vector. Rows are in the order of the frame
/// they were extracted from.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    target: Array1<f64>,
    feature_names: Vec<String>,
    target_name: String,
}

impl Dataset {
    pub fn new(
        features: Array2<f64>,
        target: Array1<f64>,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
    ) -> Result<Self, DatasetError> {
        if features.nrows() != target.len() {
            return Err(DatasetError::ShapeMismatch {
                rows: features.nrows(),
                target_len: target.len(),
            });
        }
        Ok(Self {
            features,
            target,
            feature_names,
            target_name: target_name.into(),
        })
    }

    /// Extracts `features` and `target` from a frame, keeping only rows where all
    /// of them are present.
    pub fn from_frame(
        frame: &DataFrame,
        features: &[String],
        target: &str,
    ) -> Result<Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::NoFeatures);
        }
        if features.iter().any(|f| f == target) {
            return Err(DatasetError::TargetIsFeature(target.to_string()));
        }

        let columns = features
            .iter()
            .map(|f| column_values(frame, f))
            .collect::<Result<Vec<_>, _>>()?;
        let target_values = column_values(frame, target)?;

        let complete: Vec<usize> = (0..frame.height())
            .filter(|&row| {
                target_values[row].is_some() && columns.iter().all(|c| c[row].is_some())
            })
            .collect();
        let dropped = frame.height() - complete.len();
        if dropped > 0 {
            debug!("Dropping {} rows with absent features or target", dropped);
        }

        let x = Array2::from_shape_fn((complete.len(), features.len()), |(i, j)| {
            columns[j][complete[i]].unwrap_or(f64::NAN)
        });
        let y = Array1::from_iter(
            complete
                .iter()
                .map(|&row| target_values[row].unwrap_or(f64::NAN)),
        );

        Self::new(x, y, features.to_vec(), target)
    }

    pub fn n_rows(&self) -> usize {
        self.target.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn target(&self) -> &Array1<f64> {
        &self.target
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Partitions the rows into train and test sets.
    ///
    /// The test set has `ceil(test_fraction * n_rows)` rows; the training set gets
    /// the rest. Rows are assigned by shuffling the row indices with a ChaCha8
    /// generator seeded from `seed`: the first rows of the permutation form the
    /// test set. The same seed and row order always give the same split.
    ///
    /// # Errors
    ///
    /// [`DatasetError::InvalidTestFraction`] unless `0 < test_fraction < 1`, and
    /// [`DatasetError::InsufficientData`] if either side would be empty.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Result<TrainTestSplit, DatasetError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DatasetError::InvalidTestFraction(test_fraction));
        }
        let n = self.n_rows();
        let n_test = (test_fraction * n as f64).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(DatasetError::InsufficientData {
                rows: n,
                train: n_train,
                test: n_test,
            });
        }

        let mut permutation: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        permutation.shuffle(&mut rng);
        let (test_indices, train_indices) = permutation.split_at(n_test);

        info!(
            "Split {} rows into {} train / {} test (seed {})",
            n, n_train, n_test, seed
        );

        Ok(TrainTestSplit {
            x_train: self.features.select(Axis(0), train_indices),
            y_train: self.target.select(Axis(0), train_indices),
            x_test: self.features.select(Axis(0), test_indices),
            y_test: self.target.select(Axis(0), test_indices),
            train_indices: train_indices.to_vec(),
            test_indices: test_indices.to_vec(),
            feature_names: self.feature_names.clone(),
        })
    }
}

/// Train and test subsets of a [`Dataset`], with the row indices they came from.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub feature_names: Vec<String>,
}

impl TrainTestSplit {
    pub fn n_train(&self) -> usize {
        self.y_train.len()
    }

    pub fn n_test(&self) -> usize {
        self.y_test.len()
    }
}
