//! Session configuration: noise statistics and motion model selection.

use crate::estimator::LinearModel;
use crate::prelude::{EstimatorError, EstimatorResult};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Motion model used when a session seeds its estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ModelKind {
    /// Static quantity: identity transition and observation.
    #[default]
    RandomWalk,
    /// Position and velocity, observing position every `dt`.
    ConstantVelocity { dt: f64 },
}

/// Statistics used to create a session's estimator from its first sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub initial_variance: f64,
    pub process_noise: f64,
    pub measurement_noise: f64,
    pub model: ModelKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_variance: 100.0,
            process_noise: 1e-4,
            measurement_noise: 1.0,
            model: ModelKind::RandomWalk,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> EstimatorResult<()> {
        for (name, value) in [
            ("initial_variance", self.initial_variance),
            ("process_noise", self.process_noise),
            ("measurement_noise", self.measurement_noise),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EstimatorError::InvalidInput(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn build_model(&self) -> EstimatorResult<LinearModel> {
        match self.model {
            ModelKind::RandomWalk => {
                LinearModel::random_walk(self.process_noise, self.measurement_noise)
            }
            ModelKind::ConstantVelocity { dt } => {
                LinearModel::constant_velocity(dt, self.process_noise, self.measurement_noise)
            }
        }
    }

    /// Initial state and covariance seeded from the first measurement.
    /// Unobserved components start at zero with the same initial variance.
    pub fn seed(&self, model: &LinearModel, value: f64) -> (Array1<f64>, Array2<f64>) {
        let n = model.state_dim();
        let mut state = Array1::zeros(n);
        state[0] = value;
        let covariance = Array2::eye(n) * self.initial_variance;
        (state, covariance)
    }
}
