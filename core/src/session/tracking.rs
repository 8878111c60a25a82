//! Stateful tracking of a single scalar signal.
//!
//! A session starts [`SessionState::Uninitialized`] and becomes
//! [`SessionState::Active`] on its first observation, which seeds the
//! estimator without running a filter cycle. There is no way back; discard
//! the session to start over.

use crate::estimator::LinearEstimator;
use crate::prelude::{EstimatorError, EstimatorResult, FilterOutput, StepMode};
use crate::session::config::SessionConfig;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use ndarray::{arr1, Array1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Active,
}

#[derive(Debug)]
enum Lifecycle {
    Uninitialized,
    Active {
        estimator: LinearEstimator,
        control: Array1<f64>,
    },
}

#[derive(Debug)]
pub struct TrackingSession {
    config: SessionConfig,
    lifecycle: Lifecycle,
    measurements: Vec<f64>,
    estimates: Vec<f64>,
    variances: Vec<f64>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

fn ensure_finite(value: f64) -> EstimatorResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EstimatorError::InvalidInput(format!(
            "measurement must be finite, got {}",
            value
        )))
    }
}

impl TrackingSession {
    pub fn new(config: SessionConfig) -> EstimatorResult<Self> {
        config.validate()?;
        // Build once up front so a bad model surfaces here, not on first sample.
        config.build_model()?;
        Ok(Self {
            config,
            lifecycle: Lifecycle::Uninitialized,
            measurements: Vec::new(),
            estimates: Vec::new(),
            variances: Vec::new(),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("kalmancore::session"),
        })
    }

    /// Creates a session already seeded with `value`.
    pub fn with_initial(config: SessionConfig, value: f64) -> EstimatorResult<Self> {
        let mut session = Self::new(config)?;
        session.observe(value)?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        match self.lifecycle {
            Lifecycle::Uninitialized => SessionState::Uninitialized,
            Lifecycle::Active { .. } => SessionState::Active,
        }
    }

    pub fn estimator(&self) -> Option<&LinearEstimator> {
        match &self.lifecycle {
            Lifecycle::Uninitialized => None,
            Lifecycle::Active { estimator, .. } => Some(estimator),
        }
    }

    /// Folds `value` into the session and returns the filtered estimate.
    ///
    /// On error nothing is recorded and the estimator keeps its prior state.
    pub fn observe(&mut self, value: f64) -> EstimatorResult<f64> {
        let result = ensure_finite(value).and_then(|_| self.advance(value));
        match result {
            Ok(output) => {
                self.measurements.push(value);
                self.estimates.push(output.estimate);
                self.variances.push(output.variance);
                self.metrics.record_observed();
                Ok(output.estimate)
            }
            Err(err) => {
                self.metrics.record_error();
                self.logger
                    .warn(&format!("observation {} rejected: {}", value, err));
                Err(err)
            }
        }
    }

    /// Estimate the session would produce for `value`, without recording it.
    pub fn peek(&self, value: f64) -> EstimatorResult<f64> {
        self.metrics.record_preview();
        ensure_finite(value).inspect_err(|_| self.metrics.record_error())?;
        match &self.lifecycle {
            Lifecycle::Uninitialized => Ok(value),
            Lifecycle::Active { estimator, control } => estimator
                .step_preview(control.view(), arr1(&[value]).view())
                .map(|result| result.state[0])
                .inspect_err(|_| self.metrics.record_error()),
        }
    }

    /// Single entry point dispatching on `mode`.
    pub fn process(&mut self, value: f64, mode: StepMode) -> EstimatorResult<f64> {
        match mode {
            StepMode::Commit => self.observe(value),
            StepMode::Preview => self.peek(value),
        }
    }

    fn advance(&mut self, value: f64) -> EstimatorResult<FilterOutput> {
        match &mut self.lifecycle {
            Lifecycle::Uninitialized => {
                let model = self.config.build_model()?;
                let (state, covariance) = self.config.seed(&model, value);
                let estimator = LinearEstimator::new(model, state, covariance)?;
                let control = estimator.zero_control();
                self.lifecycle = Lifecycle::Active { estimator, control };
                self.logger.record(&format!(
                    "session seeded at {} (variance {})",
                    value, self.config.initial_variance
                ));
                Ok(FilterOutput {
                    estimate: value,
                    variance: self.config.initial_variance,
                })
            }
            Lifecycle::Active { estimator, control } => {
                let result = estimator.step(control.view(), arr1(&[value]).view())?;
                let output = FilterOutput {
                    estimate: result.state[0],
                    variance: result.covariance[[0, 0]],
                };
                self.logger.trace(&format!(
                    "measurement {} -> estimate {:.6} variance {:.6}",
                    value, output.estimate, output.variance
                ));
                Ok(output)
            }
        }
    }

    pub fn last_measurement(&self) -> EstimatorResult<f64> {
        self.measurements
            .last()
            .copied()
            .ok_or(EstimatorError::EmptySession)
    }

    pub fn last_estimate(&self) -> EstimatorResult<f64> {
        self.estimates
            .last()
            .copied()
            .ok_or(EstimatorError::EmptySession)
    }

    pub fn last_variance(&self) -> EstimatorResult<f64> {
        self.variances
            .last()
            .copied()
            .ok_or(EstimatorError::EmptySession)
    }

    pub fn latest(&self) -> EstimatorResult<FilterOutput> {
        Ok(FilterOutput {
            estimate: self.last_estimate()?,
            variance: self.last_variance()?,
        })
    }

    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }

    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    /// `(measurement, estimate, variance)` triples in observation order.
    pub fn records(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.measurements
            .iter()
            .zip(&self.estimates)
            .zip(&self.variances)
            .map(|((m, e), v)| (*m, *e, *v))
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::config::ModelKind;
    use approx::assert_abs_diff_eq;

    fn session() -> TrackingSession {
        TrackingSession::new(SessionConfig::default()).unwrap()
    }

    /// Deterministic zero-mean jitter in [-amplitude, amplitude].
    fn jitter(index: usize, amplitude: f64) -> f64 {
        let phase = (index as f64 * 12.9898).sin() * 43_758.545_3;
        (phase - phase.floor()) * 2.0 * amplitude - amplitude
    }

    #[test]
    fn accessors_fail_before_first_observation() {
        let tracker = session();
        assert_eq!(tracker.state(), SessionState::Uninitialized);
        assert_eq!(tracker.last_measurement(), Err(EstimatorError::EmptySession));
        assert_eq!(tracker.last_estimate(), Err(EstimatorError::EmptySession));
        assert_eq!(tracker.last_variance(), Err(EstimatorError::EmptySession));
        assert!(tracker.is_empty());
    }

    #[test]
    fn first_observation_seeds_without_filtering() {
        let mut tracker = session();
        assert_eq!(tracker.observe(7.25).unwrap(), 7.25);
        assert_eq!(tracker.state(), SessionState::Active);
        assert_eq!(tracker.last_measurement().unwrap(), 7.25);
        assert_eq!(tracker.last_estimate().unwrap(), 7.25);
        assert_eq!(tracker.last_variance().unwrap(), 100.0);
    }

    #[test]
    fn peek_on_fresh_session_returns_input_and_stays_uninitialized() {
        let mut tracker = session();
        assert_eq!(tracker.peek(3.5).unwrap(), 3.5);
        assert_eq!(tracker.state(), SessionState::Uninitialized);
        assert!(tracker.estimator().is_none());

        assert_eq!(tracker.observe(9.0).unwrap(), 9.0);
        assert_eq!(tracker.last_variance().unwrap(), 100.0);
    }

    #[test]
    fn histories_stay_aligned() {
        let mut tracker = session();
        for (i, value) in [1.0, 2.0, 1.5, 1.7, 1.6, 1.65].iter().enumerate() {
            tracker.observe(*value).unwrap();
            assert_eq!(tracker.measurements().len(), i + 1);
            assert_eq!(tracker.estimates().len(), i + 1);
            assert_eq!(tracker.variances().len(), i + 1);
        }
        assert_eq!(tracker.records().count(), 6);
        assert_eq!(tracker.metrics().observed, 6);
    }

    #[test]
    fn peek_is_side_effect_free() {
        let mut reference = session();
        let mut previewed = session();
        for value in [4.0, 4.4, 3.9] {
            reference.observe(value).unwrap();
            previewed.observe(value).unwrap();
        }

        let first = previewed.peek(10.0).unwrap();
        for _ in 0..5 {
            assert_eq!(previewed.peek(10.0).unwrap(), first);
        }
        assert_eq!(previewed.len(), 3);

        assert_eq!(previewed.observe(4.2).unwrap(), reference.observe(4.2).unwrap());
        assert_eq!(previewed.last_variance().unwrap(), reference.last_variance().unwrap());
        assert_eq!(previewed.metrics().previews, 5 + 1);
    }

    #[test]
    fn peek_matches_following_observe() {
        let mut tracker = TrackingSession::with_initial(SessionConfig::default(), 2.0).unwrap();
        let preview = tracker.process(2.5, StepMode::Preview).unwrap();
        let committed = tracker.process(2.5, StepMode::Commit).unwrap();
        assert_eq!(preview, committed);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn reference_scenario_smooths_between_measurement_and_estimate() {
        let mut tracker = session();
        let measurements = [5.0, 5.2, 4.9, 5.1, 5.0];
        let mut previous = tracker.observe(measurements[0]).unwrap();
        assert_eq!(previous, 5.0);

        for &z in &measurements[1..] {
            let estimate = tracker.observe(z).unwrap();
            if z != previous {
                let (lo, hi) = if z < previous { (z, previous) } else { (previous, z) };
                assert!(estimate > lo && estimate < hi, "{} not in ({}, {})", estimate, lo, hi);
            }
            previous = estimate;
        }
        assert!(tracker.last_variance().unwrap() < 100.0);
    }

    #[test]
    fn repeated_measurement_moves_estimate_closer() {
        let mut tracker = session();
        tracker.observe(0.0).unwrap();
        tracker.observe(10.0).unwrap();
        let before = (tracker.last_estimate().unwrap() - 10.0).abs();
        tracker.observe(10.0).unwrap();
        let after = (tracker.last_estimate().unwrap() - 10.0).abs();
        assert!(after < before);
    }

    #[test]
    fn converges_on_noisy_constant() {
        let mut tracker = session();
        let truth = 42.0;
        for i in 0..500 {
            tracker.observe(truth + jitter(i, 1.0)).unwrap();
        }
        let variances = tracker.variances();
        for pair in variances[1..].windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12);
        }
        assert_abs_diff_eq!(tracker.last_estimate().unwrap(), truth, epsilon = 0.25);
    }

    #[test]
    fn non_finite_measurement_is_rejected_without_recording() {
        let mut tracker = TrackingSession::with_initial(SessionConfig::default(), 1.0).unwrap();
        assert!(matches!(
            tracker.observe(f64::NAN),
            Err(EstimatorError::InvalidInput(_))
        ));
        assert!(tracker.peek(f64::INFINITY).is_err());
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.metrics().errors, 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            initial_variance: f64::NAN,
            ..Default::default()
        };
        assert!(TrackingSession::new(config).is_err());
    }

    #[test]
    fn constant_velocity_session_tracks_ramp() {
        let config = SessionConfig {
            process_noise: 1e-6,
            measurement_noise: 0.01,
            model: ModelKind::ConstantVelocity { dt: 1.0 },
            ..Default::default()
        };
        let mut tracker = TrackingSession::new(config).unwrap();
        for k in 0..60 {
            tracker.observe(0.5 * k as f64).unwrap();
        }
        assert_abs_diff_eq!(tracker.last_estimate().unwrap(), 29.5, epsilon = 0.05);
        let velocity = tracker.estimator().unwrap().state_estimate()[1];
        assert_abs_diff_eq!(velocity, 0.5, epsilon = 1e-2);
    }
}
