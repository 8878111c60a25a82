//! Request and response bodies for the HTTP bridge.

use kalmancore::telemetry::MetricsSnapshot;
use kalmancore::{SessionState, TrackingSession};
use serde::{Deserialize, Serialize};

/// Body of `POST /observe` and `POST /peek`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueRequest {
    pub value: f64,
}

/// Read-only snapshot of a session served by `GET /session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub state: SessionState,
    pub observations: usize,
    pub last_measurement: Option<f64>,
    pub last_estimate: Option<f64>,
    pub last_variance: Option<f64>,
    pub metrics: MetricsSnapshot,
}

impl SessionView {
    pub fn from_session(session: &TrackingSession) -> Self {
        Self {
            state: session.state(),
            observations: session.len(),
            last_measurement: session.last_measurement().ok(),
            last_estimate: session.last_estimate().ok(),
            last_variance: session.last_variance().ok(),
            metrics: session.metrics(),
        }
    }
}
