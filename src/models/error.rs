use thiserror::Error;

/// Failures of a single regressor. The harness records these per model instead
/// of aborting the study.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("No rows to evaluate")]
    EmptyEvaluationSet,

    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("Input contains non-finite values")]
    NonFiniteInput,

    #[error("Training set has {rows} rows, more than the {max} this model supports")]
    TooManySamples { rows: usize, max: usize },

    #[error("Numerical failure: {0}")]
    Numerical(String),

    #[error("Target is constant over the evaluation rows, R2 is undefined")]
    DegenerateTarget,
}
