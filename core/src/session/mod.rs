//! Stateful tracking sessions built on the estimator.

pub mod config;
pub mod tracking;

pub use config::{ModelKind, SessionConfig};
pub use tracking::{SessionState, TrackingSession};
