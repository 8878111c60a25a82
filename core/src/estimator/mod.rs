//! Linear-Gaussian model and recursive estimator.

pub mod linear;
pub mod model;

pub use linear::{LinearEstimator, StepResult};
pub use model::LinearModel;
