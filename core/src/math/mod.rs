//! Numeric helpers used by the estimator and the driver.

pub mod matrix;
pub mod stats;

pub use matrix::MatrixHelper;
pub use stats::StatsHelper;
