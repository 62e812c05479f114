//! The two parallel modelling pipelines: without and with lag features.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which feature set a model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Only the same-day predictors.
    Baseline,
    /// Same-day predictors plus `{signal}_lag_{k}` columns.
    LagAugmented,
}

impl Variant {
    pub const BOTH: [Variant; 2] = [Variant::Baseline, Variant::LagAugmented];

    /// Stable machine key, used in logs.
    pub fn key(&self) -> &'static str {
        match self {
            Variant::Baseline => "baseline",
            Variant::LagAugmented => "lag_augmented",
        }
    }

    /// Value written to the `Tipo` column of the comparison artifact.
    ///
    /// ```
    /// use climalag::Variant;
    ///
    /// assert_eq!(Variant::Baseline.label(), "Sem Lag Features");
    /// assert_eq!(Variant::LagAugmented.label(), "Com Lag Features");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Baseline => "Sem Lag Features",
            Variant::LagAugmented => "Com Lag Features",
        }
    }

    /// Suffix appended to the model name in the `Modelo` column.
    pub(crate) fn model_suffix(&self) -> &'static str {
        match self {
            Variant::Baseline => "Sem Lags",
            Variant::LagAugmented => "Com Lags",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
