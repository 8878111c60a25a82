//! Shared error type, result alias and output types.

use serde::{Deserialize, Serialize};

/// Scalar view of one filter cycle, as reported back to stream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterOutput {
    pub estimate: f64,
    pub variance: f64,
}

/// Whether a measurement is folded into the session or only evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    #[default]
    Commit,
    Preview,
}

/// Common error type for estimator and session operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("dimension mismatch for {what}: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,
    #[error("session has no observations yet")]
    EmptySession,
    #[error("filter diverged: covariance entry ({row}, {col}) is {value}")]
    FilterDivergence { row: usize, col: usize, value: f64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type EstimatorResult<T> = Result<T, EstimatorError>;
