//! Discrete-time linear Kalman filter.
//!
//! One call to [`LinearEstimator::step`] runs a full predict + update cycle:
//!
//! ```text
//! x' = A·x + B·u            P' = A·P·Aᵀ + Q
//! y  = z − H·x'             S  = H·P'·Hᵀ + R
//! K  = P'·Hᵀ·S⁻¹
//! x  = x' + K·y             P  = (I − K·H)·P'
//! ```
//!
//! The cycle is computed into a candidate first and committed only if it
//! succeeds, so a failed step never leaves partial state behind.

use crate::estimator::model::LinearModel;
use crate::math::matrix::MatrixHelper;
use crate::prelude::{EstimatorError, EstimatorResult};
use ndarray::{Array1, Array2, ArrayView1};

/// Relative tolerance used when checking covariance symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Everything produced by one predict + update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub state: Array1<f64>,
    pub covariance: Array2<f64>,
    /// y = z − H·x'
    pub innovation: Array1<f64>,
    /// S = H·P'·Hᵀ + R
    pub innovation_covariance: Array2<f64>,
    pub gain: Array2<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearEstimator {
    model: LinearModel,
    state_estimate: Array1<f64>,
    state_covariance: Array2<f64>,
}

impl LinearEstimator {
    pub fn new(
        model: LinearModel,
        initial_state: Array1<f64>,
        initial_covariance: Array2<f64>,
    ) -> EstimatorResult<Self> {
        let n = model.state_dim();
        if initial_state.len() != n {
            return Err(EstimatorError::DimensionMismatch {
                what: "initial_state",
                expected: (n, 1),
                found: (initial_state.len(), 1),
            });
        }
        if initial_covariance.dim() != (n, n) {
            return Err(EstimatorError::DimensionMismatch {
                what: "initial_covariance",
                expected: (n, n),
                found: initial_covariance.dim(),
            });
        }
        if let Some((index, value)) = MatrixHelper::first_invalid_diagonal(initial_covariance.view())
        {
            return Err(EstimatorError::InvalidInput(format!(
                "initial covariance entry {} is {}",
                index, value
            )));
        }
        if !MatrixHelper::is_symmetric(initial_covariance.view(), SYMMETRY_TOLERANCE) {
            return Err(EstimatorError::InvalidInput(
                "initial covariance is not symmetric".into(),
            ));
        }

        Ok(Self {
            model,
            state_estimate: initial_state,
            state_covariance: initial_covariance,
        })
    }

    pub fn state_estimate(&self) -> &Array1<f64> {
        &self.state_estimate
    }

    pub fn state_covariance(&self) -> &Array2<f64> {
        &self.state_covariance
    }

    /// Control vector of the right size with every entry zero.
    pub fn zero_control(&self) -> Array1<f64> {
        Array1::zeros(self.model.control_dim())
    }

    /// Runs one cycle and commits the result.
    pub fn step(
        &mut self,
        control: ArrayView1<f64>,
        measurement: ArrayView1<f64>,
    ) -> EstimatorResult<StepResult> {
        let result = self.cycle(control, measurement)?;
        self.state_estimate = result.state.clone();
        self.state_covariance = result.covariance.clone();
        Ok(result)
    }

    /// Runs the same cycle as [`step`](Self::step) without committing.
    pub fn step_preview(
        &self,
        control: ArrayView1<f64>,
        measurement: ArrayView1<f64>,
    ) -> EstimatorResult<StepResult> {
        self.cycle(control, measurement)
    }

    fn cycle(
        &self,
        control: ArrayView1<f64>,
        measurement: ArrayView1<f64>,
    ) -> EstimatorResult<StepResult> {
        self.check_inputs(control, measurement)?;

        let a = self.model.transition();
        let h = self.model.observation();
        let h_t = MatrixHelper::transpose(h.view());

        let (predicted_state, predicted_cov) = self.predict(control);

        let innovation = &measurement - &MatrixHelper::apply(h.view(), predicted_state.view());
        let innovation_covariance = MatrixHelper::multiply(
            MatrixHelper::multiply(h.view(), predicted_cov.view()).view(),
            h_t.view(),
        ) + self.model.measurement_noise();

        let s_inv = MatrixHelper::invert(innovation_covariance.view())
            .ok_or(EstimatorError::SingularInnovationCovariance)?;
        let gain = MatrixHelper::multiply(
            MatrixHelper::multiply(predicted_cov.view(), h_t.view()).view(),
            s_inv.view(),
        );

        let state = &predicted_state + &MatrixHelper::apply(gain.view(), innovation.view());
        let identity = MatrixHelper::identity(a.nrows());
        let covariance = MatrixHelper::multiply(
            (identity - MatrixHelper::multiply(gain.view(), h.view())).view(),
            predicted_cov.view(),
        );

        Self::check_covariance(&covariance)?;

        Ok(StepResult {
            state,
            covariance,
            innovation,
            innovation_covariance,
            gain,
        })
    }

    fn predict(&self, control: ArrayView1<f64>) -> (Array1<f64>, Array2<f64>) {
        let a = self.model.transition();
        let b = self.model.control_gain();
        let state = MatrixHelper::apply(a.view(), self.state_estimate.view())
            + MatrixHelper::apply(b.view(), control);
        let covariance = MatrixHelper::multiply(
            MatrixHelper::multiply(a.view(), self.state_covariance.view()).view(),
            a.t(),
        ) + self.model.process_noise();
        (state, covariance)
    }

    fn check_inputs(
        &self,
        control: ArrayView1<f64>,
        measurement: ArrayView1<f64>,
    ) -> EstimatorResult<()> {
        if control.len() != self.model.control_dim() {
            return Err(EstimatorError::DimensionMismatch {
                what: "control",
                expected: (self.model.control_dim(), 1),
                found: (control.len(), 1),
            });
        }
        if measurement.len() != self.model.measurement_dim() {
            return Err(EstimatorError::DimensionMismatch {
                what: "measurement",
                expected: (self.model.measurement_dim(), 1),
                found: (measurement.len(), 1),
            });
        }
        if measurement.iter().chain(control.iter()).any(|v| !v.is_finite()) {
            return Err(EstimatorError::InvalidInput(
                "control and measurement must be finite".into(),
            ));
        }
        Ok(())
    }

    fn check_covariance(covariance: &Array2<f64>) -> EstimatorResult<()> {
        if let Some((index, value)) = MatrixHelper::first_invalid_diagonal(covariance.view()) {
            log::warn!("covariance diverged at diagonal {} ({})", index, value);
            return Err(EstimatorError::FilterDivergence {
                row: index,
                col: index,
                value,
            });
        }
        if let Some((row, col, diff)) =
            MatrixHelper::first_asymmetry(covariance.view(), SYMMETRY_TOLERANCE)
        {
            log::warn!("covariance lost symmetry at ({}, {}) by {}", row, col, diff);
            return Err(EstimatorError::FilterDivergence {
                row,
                col,
                value: covariance[[row, col]],
            });
        }
        Ok(())
    }
}
