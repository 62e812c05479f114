//! Per-feature standardization and a wrapper that applies it around a model.

use crate::models::error::ModelError;
use crate::models::{check_feature_count, Regressor};
use crate::types::model_kind::ModelKind;
use ndarray::{Array1, Array2, Axis};

/// Rescales every column to zero mean and unit (population) variance.
/// Constant columns keep a scale of 1 so they map to zero.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), ModelError> {
        let mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let scale = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 0.0 { s } else { 1.0 });
        self.mean = Some(mean);
        self.scale = Some(scale);
        Ok(())
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => (mean, scale),
            _ => return Err(ModelError::NotFitted),
        };
        check_feature_count(x, mean.len())?;
        Ok((x - &mean.view().insert_axis(Axis(0))) / &scale.view().insert_axis(Axis(0)))
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Standardizes inputs before handing them to the inner model.
pub struct Scaled {
    scaler: StandardScaler,
    inner: Box<dyn Regressor>,
}

impl Scaled {
    pub fn new(inner: Box<dyn Regressor>) -> Self {
        Self {
            scaler: StandardScaler::new(),
            inner,
        }
    }
}

impl Regressor for Scaled {
    fn kind(&self) -> ModelKind {
        self.inner.kind()
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let scaled = self.scaler.fit_transform(x)?;
        self.inner.fit(&scaled, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let scaled = self.scaler.transform(x)?;
        self.inner.predict(&scaled)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.inner.feature_importances()
    }
}
