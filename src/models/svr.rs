//! Epsilon-insensitive support vector regression with an RBF kernel.
//!
//! The dual problem is solved by cyclic coordinate descent on the combined
//! coefficients `β = α − α*`. The target is centered and the kernel is
//! augmented by a constant `1`, which folds a (regularized) bias term into
//! the dual so no equality constraint is needed.

use crate::models::error::ModelError;
use crate::models::{check_feature_count, check_training_data, Regressor};
use crate::types::model_kind::ModelKind;
use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;

/// Kernel matrices beyond this many rows are refused.
pub const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Coefficients with magnitude below this are not kept as support vectors.
const SUPPORT_THRESHOLD: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gamma {
    /// `1 / (n_features · Var(X))`, with the variance over every entry of X.
    Scale,
    Fixed(f64),
}

#[derive(Debug, Clone)]
pub struct SvrParams {
    pub c: f64,
    pub epsilon: f64,
    pub gamma: Gamma,
    /// Full passes over the coefficients.
    pub max_iter: usize,
    /// Stop once no coefficient moves more than this in a pass.
    pub tol: f64,
}

impl Default for SvrParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.1,
            gamma: Gamma::Scale,
            max_iter: 1000,
            tol: 1e-3,
        }
    }
}

#[derive(Debug, Clone)]
struct FittedSvr {
    support_vectors: Array2<f64>,
    coefficients: Array1<f64>,
    gamma: f64,
    y_offset: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SvrRegressor {
    params: SvrParams,
    fitted: Option<FittedSvr>,
}

fn rbf(a: ArrayView1<f64>, b: ArrayView1<f64>, gamma: f64) -> f64 {
    let sq: f64 = a.iter().zip(b.iter()).map(|(u, v)| (u - v) * (u - v)).sum();
    (-gamma * sq).exp()
}

impl SvrRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: SvrParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn n_support_vectors(&self) -> usize {
        self.fitted
            .as_ref()
            .map_or(0, |f| f.support_vectors.nrows())
    }

    fn resolve_gamma(&self, x: &Array2<f64>) -> f64 {
        match self.params.gamma {
            Gamma::Fixed(gamma) => gamma,
            Gamma::Scale => {
                let variance = x.var(0.0);
                if variance > 0.0 {
                    1.0 / (x.ncols() as f64 * variance)
                } else {
                    1.0
                }
            }
        }
    }

    /// Augmented kernel `k(xi, xj) + 1`, computed row-parallel.
    fn kernel_matrix(x: &Array2<f64>, gamma: f64) -> Result<Array2<f64>, ModelError> {
        let n = x.nrows();
        let entries: Vec<f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (0..n).map(move |j| rbf(x.row(i), x.row(j), gamma) + 1.0))
            .collect();
        Array2::from_shape_vec((n, n), entries)
            .map_err(|e| ModelError::Numerical(format!("kernel matrix: {}", e)))
    }
}

impl Regressor for SvrRegressor {
    fn kind(&self) -> ModelKind {
        ModelKind::Svr
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_training_data(x, y)?;
        let n = x.nrows();
        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(ModelError::TooManySamples {
                rows: n,
                max: MAX_KERNEL_MATRIX_SAMPLES,
            });
        }
        let SvrParams {
            c,
            epsilon,
            max_iter,
            tol,
            ..
        } = self.params;
        if !(c > 0.0) || !(epsilon >= 0.0) {
            return Err(ModelError::Numerical(format!(
                "invalid SVR parameters C={} epsilon={}",
                c, epsilon
            )));
        }

        let gamma = self.resolve_gamma(x);
        let y_offset = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let target = y - y_offset;
        let q = Self::kernel_matrix(x, gamma)?;

        let mut beta = Array1::<f64>::zeros(n);
        // q · beta, kept current after every coordinate step.
        let mut q_beta = Array1::<f64>::zeros(n);
        let mut converged = false;
        let mut passes = 0;

        while passes < max_iter {
            passes += 1;
            let mut max_step: f64 = 0.0;
            for i in 0..n {
                let q_ii = q[[i, i]];
                let gradient = q_beta[i] - target[i];
                let z = beta[i] - gradient / q_ii;
                let shrink = epsilon / q_ii;
                let updated = (z.signum() * (z.abs() - shrink).max(0.0)).clamp(-c, c);
                let step = updated - beta[i];
                if step != 0.0 {
                    q_beta.scaled_add(step, &q.column(i));
                    beta[i] = updated;
                    max_step = max_step.max(step.abs());
                }
            }
            if max_step < tol {
                converged = true;
                break;
            }
        }
        if converged {
            debug!("SVR converged after {} passes", passes);
        } else {
            warn!("SVR reached {} passes without converging", max_iter);
        }

        let support: Vec<usize> = (0..n)
            .filter(|&i| beta[i].abs() > SUPPORT_THRESHOLD)
            .collect();
        self.fitted = Some(FittedSvr {
            support_vectors: x.select(Axis(0), &support),
            coefficients: beta.select(Axis(0), &support),
            gamma,
            y_offset,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotFitted)?;
        check_feature_count(x, fitted.support_vectors.ncols())?;
        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                fitted
                    .support_vectors
                    .outer_iter()
                    .zip(fitted.coefficients.iter())
                    .map(|(sv, b)| b * (rbf(row, sv, fitted.gamma) + 1.0))
                    .sum::<f64>()
                    + fitted.y_offset
            })
            .collect();
        Ok(Array1::from_vec(predictions))
    }
}
