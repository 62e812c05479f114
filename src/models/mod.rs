//! Regressors used by the evaluation harness.
//!
//! Every model implements [`Regressor`]; [`build_regressor`] maps a
//! [`ModelKind`] to a fresh, unfitted instance with the study's settings.

pub mod boosting;
pub mod error;
pub mod forest;
pub mod linear;
pub mod scaler;
pub mod svr;
pub mod tree;

use crate::models::boosting::GradientBoostingRegressor;
use crate::models::error::ModelError;
use crate::models::forest::RandomForestRegressor;
use crate::models::linear::LinearRegression;
use crate::models::scaler::Scaled;
use crate::models::svr::SvrRegressor;
use crate::types::model_kind::ModelKind;
use ndarray::{Array1, Array2};

pub trait Regressor: Send {
    fn kind(&self) -> ModelKind;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Normalized per-feature importances, for models that define them.
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Creates an unfitted regressor of the given kind. `seed` drives every random
/// choice the model makes.
pub fn build_regressor(kind: ModelKind, seed: u64) -> Box<dyn Regressor> {
    let model: Box<dyn Regressor> = match kind {
        ModelKind::LinearRegression => Box::new(LinearRegression::new()),
        ModelKind::RandomForest => Box::new(RandomForestRegressor::new(seed)),
        ModelKind::GradientBoosting => Box::new(GradientBoostingRegressor::new(seed)),
        ModelKind::Svr => Box::new(SvrRegressor::new()),
    };
    if kind.requires_scaling() {
        Box::new(Scaled::new(model))
    } else {
        model
    }
}

/// Checks a training pair for emptiness, matching lengths and finite values.
pub(crate) fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            expected: format!("{} targets", x.nrows()),
            found: format!("{} targets", y.len()),
        });
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteInput);
    }
    Ok(())
}

pub(crate) fn check_feature_count(x: &Array2<f64>, expected: usize) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::ShapeMismatch {
            expected: format!("{} features", expected),
            found: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}
