//! Recursive linear state estimation for noisy, irregularly sampled signals.
//!
//! [`estimator`] holds the linear-Gaussian filter itself; [`session`] wraps
//! it with lazy seeding, append-only histories and side-effect-free previews.

pub mod estimator;
pub mod math;
pub mod prelude;
pub mod session;
pub mod stream;
pub mod telemetry;

pub use estimator::{LinearEstimator, LinearModel, StepResult};
pub use prelude::{EstimatorError, EstimatorResult, FilterOutput, StepMode};
pub use session::{ModelKind, SessionConfig, SessionState, TrackingSession};
pub use stream::{EstimateRecord, MeasurementSample};
