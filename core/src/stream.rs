//! Records exchanged with upstream measurement sources and downstream consumers.

use crate::prelude::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};

/// One timestamped scalar measurement as delivered by upstream tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSample {
    pub timestamp: f64,
    pub value: f64,
}

impl MeasurementSample {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Parses one `{"timestamp": .., "value": ..}` JSON line.
    pub fn from_json_line(line: &str) -> EstimatorResult<Self> {
        serde_json::from_str(line.trim())
            .map_err(|err| EstimatorError::InvalidInput(format!("bad sample line: {}", err)))
    }
}

/// Filtered output paired with the measurement that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateRecord {
    pub timestamp: f64,
    pub measurement: f64,
    pub estimate: f64,
    pub variance: f64,
}

impl EstimateRecord {
    pub fn new(timestamp: f64, measurement: f64, estimate: f64, variance: f64) -> Self {
        Self {
            timestamp,
            measurement,
            estimate,
            variance,
        }
    }
}

/// Parses a JSON-lines document, skipping blank lines and `#` comments.
pub fn parse_samples(contents: &str) -> EstimatorResult<Vec<MeasurementSample>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            MeasurementSample::from_json_line(line).map_err(|err| match err {
                EstimatorError::InvalidInput(msg) => {
                    EstimatorError::InvalidInput(format!("line {}: {}", index + 1, msg))
                }
                other => other,
            })
        })
        .collect()
}
