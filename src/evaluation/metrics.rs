//! Regression accuracy metrics.

use crate::models::error::ModelError;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub rmse: f64,
    pub r2: f64,
    pub mae: f64,
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<(), ModelError> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::ShapeMismatch {
            expected: format!("{} predictions", y_true.len()),
            found: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(ModelError::EmptyEvaluationSet);
    }
    if y_pred.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteInput);
    }
    Ok(())
}

pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    check_lengths(y_true, y_pred)?;
    let mse = (y_true - y_pred).mapv(|d| d * d).sum() / y_true.len() as f64;
    Ok(mse.sqrt())
}

pub fn mae(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    check_lengths(y_true, y_pred)?;
    Ok((y_true - y_pred).mapv(f64::abs).sum() / y_true.len() as f64)
}

/// Coefficient of determination, `1 − SS_res / SS_tot`.
///
/// # Errors
///
/// [`ModelError::DegenerateTarget`] when `y_true` is constant, since `SS_tot`
/// is then zero.
pub fn r2(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    check_lengths(y_true, y_pred)?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_tot = y_true.mapv(|v| (v - mean) * (v - mean)).sum();
    if ss_tot <= 0.0 {
        return Err(ModelError::DegenerateTarget);
    }
    let ss_res = (y_true - y_pred).mapv(|d| d * d).sum();
    Ok(1.0 - ss_res / ss_tot)
}

impl Metrics {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self, ModelError> {
        Ok(Self {
            rmse: rmse(y_true, y_pred)?,
            r2: r2(y_true, y_pred)?,
            mae: mae(y_true, y_pred)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn perfect_predictions() -> Result<(), ModelError> {
        let y = array![1.0, 2.0, 3.0];
        let metrics = Metrics::compute(&y, &y)?;
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2, 1.0);
        Ok(())
    }

    #[test]
    fn known_values() -> Result<(), ModelError> {
        let y_true = array![3.0, -0.5, 2.0, 7.0];
        let y_pred = array![2.5, 0.0, 2.0, 8.0];
        assert_relative_eq!(rmse(&y_true, &y_pred)?, 0.375f64.sqrt());
        assert_relative_eq!(mae(&y_true, &y_pred)?, 0.5);
        assert_relative_eq!(r2(&y_true, &y_pred)?, 0.948_608_137_044_967_9, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn constant_target_has_no_r2() {
        let y_true = array![2.0, 2.0, 2.0];
        let y_pred = array![1.0, 2.0, 3.0];
        assert_eq!(r2(&y_true, &y_pred), Err(ModelError::DegenerateTarget));
        assert!(rmse(&y_true, &y_pred).is_ok());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(matches!(
            rmse(&array![1.0], &array![1.0, 2.0]),
            Err(ModelError::ShapeMismatch { .. })
        ));
        assert_eq!(
            mae(&array![1.0], &array![f64::NAN]),
            Err(ModelError::NonFiniteInput)
        );
    }
}
