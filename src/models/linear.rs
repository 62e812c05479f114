//! Ordinary least squares with intercept.

use crate::models::error::ModelError;
use crate::models::{check_feature_count, check_training_data, Regressor};
use crate::types::model_kind::ModelKind;
use log::debug;
use ndarray::{Array1, Array2, Axis};

/// Relative ridge terms tried, in order, when the normal equations are not
/// positive definite (collinear or constant features).
const RIDGE_LADDER: [f64; 4] = [0.0, 1e-10, 1e-8, 1e-6];

/// Pivots below this fraction of the original diagonal count as singular.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Cholesky factor `L` of a symmetric positive-definite matrix, or `None`
/// when a pivot vanishes.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > 0.0 && diag > PIVOT_TOLERANCE * a[[i, i]].abs()) {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solves `L Lᵀ x = b` by forward then backward substitution.
fn cholesky_substitute(l: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let n = l.nrows();
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }
    x
}

/// Solves the symmetric system `a x = b`, adding a growing ridge to the
/// diagonal until the factorization succeeds.
pub(crate) fn solve_normal_equations(
    a: &Array2<f64>,
    b: &Array1<f64>,
) -> Result<Array1<f64>, ModelError> {
    let n = a.nrows();
    let mean_diag = a.diag().iter().map(|v| v.abs()).sum::<f64>() / n.max(1) as f64;
    let base = if mean_diag > 0.0 { mean_diag } else { 1.0 };

    for ridge in RIDGE_LADDER {
        let mut regularized = a.clone();
        if ridge > 0.0 {
            debug!("Normal equations not positive definite, ridge {:e}", ridge);
            for k in 0..n {
                regularized[[k, k]] += ridge * base;
            }
        }
        if let Some(l) = cholesky(&regularized) {
            return Ok(cholesky_substitute(&l, b));
        }
    }
    Err(ModelError::Numerical(
        "normal equations are singular even after regularization".to_string(),
    ))
}

#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_training_data(x, y)?;

        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let x_centered = x - &x_mean.view().insert_axis(Axis(0));
        let y_centered = y - y_mean;

        let xtx = x_centered.t().dot(&x_centered);
        let xty = x_centered.t().dot(&y_centered);
        let coefficients = solve_normal_equations(&xtx, &xty)?;

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Numerical(
                "least squares produced non-finite coefficients".to_string(),
            ));
        }
        self.intercept = y_mean - coefficients.dot(&x_mean);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        check_feature_count(x, coefficients.len())?;
        Ok(x.dot(coefficients) + self.intercept)
    }
}
