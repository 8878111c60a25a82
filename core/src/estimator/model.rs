//! System matrices of a linear-Gaussian model, with shapes checked up front.

use crate::prelude::{EstimatorError, EstimatorResult};
use ndarray::{array, Array2};

/// Constant matrices of a linear-Gaussian system.
///
/// Dimensions are fixed at construction: `state` rows in A, `control`
/// columns in B and `measurement` rows in H. Every other matrix is checked
/// against these by [`LinearModel::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    transition: Array2<f64>,
    control_gain: Array2<f64>,
    observation: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
    state_dim: usize,
    control_dim: usize,
    measurement_dim: usize,
}

fn expect_shape(
    what: &'static str,
    matrix: &Array2<f64>,
    expected: (usize, usize),
) -> EstimatorResult<()> {
    let found = matrix.dim();
    if found != expected {
        return Err(EstimatorError::DimensionMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

impl LinearModel {
    pub fn new(
        transition: Array2<f64>,
        control_gain: Array2<f64>,
        observation: Array2<f64>,
        process_noise: Array2<f64>,
        measurement_noise: Array2<f64>,
    ) -> EstimatorResult<Self> {
        let state_dim = transition.nrows();
        if state_dim == 0 {
            return Err(EstimatorError::InvalidInput(
                "state dimension must be at least 1".into(),
            ));
        }
        expect_shape("transition", &transition, (state_dim, state_dim))?;

        let control_dim = control_gain.ncols();
        expect_shape("control_gain", &control_gain, (state_dim, control_dim))?;

        let measurement_dim = observation.nrows();
        if measurement_dim == 0 {
            return Err(EstimatorError::InvalidInput(
                "measurement dimension must be at least 1".into(),
            ));
        }
        expect_shape("observation", &observation, (measurement_dim, state_dim))?;
        expect_shape("process_noise", &process_noise, (state_dim, state_dim))?;
        expect_shape(
            "measurement_noise",
            &measurement_noise,
            (measurement_dim, measurement_dim),
        )?;

        Ok(Self {
            transition,
            control_gain,
            observation,
            process_noise,
            measurement_noise,
            state_dim,
            control_dim,
            measurement_dim,
        })
    }

    /// Scalar random walk: `x_k = x_{k-1} + w`, `z_k = x_k + v`.
    pub fn random_walk(process_noise: f64, measurement_noise: f64) -> EstimatorResult<Self> {
        Self::new(
            array![[1.0]],
            array![[0.0]],
            array![[1.0]],
            array![[process_noise]],
            array![[measurement_noise]],
        )
    }

    /// Two-state position/velocity model sampled every `dt`, observing
    /// position only. Process noise follows the discrete white-noise
    /// acceleration form scaled by `process_noise`.
    pub fn constant_velocity(
        dt: f64,
        process_noise: f64,
        measurement_noise: f64,
    ) -> EstimatorResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(EstimatorError::InvalidInput(format!(
                "sample period must be positive, got {}",
                dt
            )));
        }
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;
        Self::new(
            array![[1.0, dt], [0.0, 1.0]],
            array![[0.0], [0.0]],
            array![[1.0, 0.0]],
            array![
                [process_noise * dt4 / 4.0, process_noise * dt3 / 2.0],
                [process_noise * dt3 / 2.0, process_noise * dt2]
            ],
            array![[measurement_noise]],
        )
    }

    pub fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    pub fn control_gain(&self) -> &Array2<f64> {
        &self.control_gain
    }

    pub fn observation(&self) -> &Array2<f64> {
        &self.observation
    }

    pub fn process_noise(&self) -> &Array2<f64> {
        &self.process_noise
    }

    pub fn measurement_noise(&self) -> &Array2<f64> {
        &self.measurement_noise
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn control_dim(&self) -> usize {
        self.control_dim
    }

    pub fn measurement_dim(&self) -> usize {
        self.measurement_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_walk_is_scalar() {
        let model = LinearModel::random_walk(1e-4, 1.0).unwrap();
        assert_eq!(model.state_dim(), 1);
        assert_eq!(model.control_dim(), 1);
        assert_eq!(model.measurement_dim(), 1);
    }

    #[test]
    fn constant_velocity_has_two_states() {
        let model = LinearModel::constant_velocity(0.5, 1.0, 1.0).unwrap();
        assert_eq!(model.state_dim(), 2);
        assert_eq!(model.measurement_dim(), 1);
        assert_eq!(model.transition()[[0, 1]], 0.5);
    }

    #[test]
    fn rejects_mismatched_observation() {
        let err = LinearModel::new(
            Array2::eye(2),
            Array2::zeros((2, 1)),
            Array2::eye(3),
            Array2::eye(2),
            Array2::eye(3),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EstimatorError::DimensionMismatch {
                what: "observation",
                expected: (3, 2),
                found: (3, 3),
            }
        );
    }

    #[test]
    fn rejects_non_square_transition() {
        let err = LinearModel::new(
            Array2::zeros((2, 3)),
            Array2::zeros((2, 1)),
            Array2::zeros((1, 2)),
            Array2::eye(2),
            Array2::eye(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EstimatorError::DimensionMismatch {
                what: "transition",
                ..
            }
        ));
    }

    fn mismatch_of(err: EstimatorError) -> (&'static str, (usize, usize), (usize, usize)) {
        match err {
            EstimatorError::DimensionMismatch {
                what,
                expected,
                found,
            } => (what, expected, found),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_control_gain_with_wrong_row_count() {
        let err = LinearModel::new(
            Array2::eye(2),
            Array2::zeros((3, 1)),
            Array2::zeros((1, 2)),
            Array2::eye(2),
            Array2::eye(1),
        )
        .unwrap_err();
        assert_eq!(mismatch_of(err), ("control_gain", (2, 1), (3, 1)));
    }

    #[test]
    fn rejects_mismatched_process_noise() {
        let err = LinearModel::new(
            Array2::eye(2),
            Array2::zeros((2, 1)),
            Array2::zeros((1, 2)),
            Array2::eye(3),
            Array2::eye(1),
        )
        .unwrap_err();
        assert_eq!(mismatch_of(err), ("process_noise", (2, 2), (3, 3)));
    }

    #[test]
    fn rejects_mismatched_measurement_noise() {
        let err = LinearModel::new(
            Array2::eye(2),
            Array2::zeros((2, 1)),
            Array2::zeros((1, 2)),
            Array2::eye(2),
            Array2::eye(2),
        )
        .unwrap_err();
        assert_eq!(mismatch_of(err), ("measurement_noise", (1, 1), (2, 2)));
    }

    #[test]
    fn rejects_non_positive_period() {
        assert!(matches!(
            LinearModel::constant_velocity(0.0, 1.0, 1.0),
            Err(EstimatorError::InvalidInput(_))
        ));
    }
}
