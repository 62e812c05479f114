//! The fixed roster of regression model families compared by a study.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A regression model family.
///
/// Every kind is fitted once per [`crate::Variant`]; the resulting
/// [`crate::ModelResult`]s are paired by kind when computing improvements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Ordinary least squares with intercept.
    LinearRegression,
    /// Bagged regression trees.
    RandomForest,
    /// Boosted shallow regression trees on squared loss.
    GradientBoosting,
    /// Epsilon-insensitive support vector regression with an RBF kernel.
    Svr,
}

impl ModelKind {
    /// All kinds, in the order they are reported.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::LinearRegression,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::Svr,
    ];

    /// Human-readable name as it appears in the artifacts.
    ///
    /// ```
    /// use climalag::ModelKind;
    ///
    /// assert_eq!(ModelKind::LinearRegression.display_name(), "Regressão Linear");
    /// assert_eq!(ModelKind::Svr.to_string(), "SVR");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Regressão Linear",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
            ModelKind::Svr => "SVR",
        }
    }

    /// Kernel methods are sensitive to feature scale and get standardized inputs.
    pub fn requires_scaling(&self) -> bool {
        matches!(self, ModelKind::Svr)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
