//! Per-session operation counters.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters kept per tracking session. Interior mutability lets read-only
/// paths such as previews still be counted.
#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub observed: usize,
    pub previews: usize,
    pub errors: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_observed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.observed += 1;
        }
    }

    pub fn record_preview(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.previews += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = MetricsRecorder::new();
        metrics.record_observed();
        metrics.record_observed();
        metrics.record_preview();
        metrics.record_error();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                observed: 2,
                previews: 1,
                errors: 1,
            }
        );
    }
}
