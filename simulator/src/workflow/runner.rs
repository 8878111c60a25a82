//! Feeds samples through a session and writes the report.

use crate::generator::build_samples;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use kalmancore::math::StatsHelper;
use kalmancore::stream::parse_samples;
use kalmancore::telemetry::MetricsSnapshot;
use kalmancore::{EstimateRecord, MeasurementSample, TrackingSession};
use log::info;
use std::fs;

#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub records: Vec<EstimateRecord>,
    pub final_estimate: f64,
    pub final_variance: f64,
    /// RMS of raw measurements against the generator truth; `None` for file input.
    pub raw_rms_error: Option<f64>,
    pub filtered_rms_error: Option<f64>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn new_session(&self) -> anyhow::Result<TrackingSession> {
        TrackingSession::new(self.config.session).context("creating tracking session")
    }

    /// Samples from the configured input file, or from the generator.
    pub fn load_samples(&self) -> anyhow::Result<Vec<MeasurementSample>> {
        match &self.config.input {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("reading samples {}", path.display()))?;
                parse_samples(&contents)
                    .with_context(|| format!("parsing samples {}", path.display()))
            }
            None => build_samples(&self.config.generator),
        }
    }

    pub fn execute(&self, samples: &[MeasurementSample]) -> anyhow::Result<WorkflowResult> {
        let mut session = self.new_session()?;
        let mut records = Vec::with_capacity(samples.len());

        for sample in samples {
            let estimate = session
                .observe(sample.value)
                .with_context(|| format!("observing sample at t={}", sample.timestamp))?;
            let variance = session.last_variance()?;
            records.push(EstimateRecord::new(
                sample.timestamp,
                sample.value,
                estimate,
                variance,
            ));
        }

        let latest = session.latest().context("workflow produced no estimates")?;

        let generator = &self.config.generator;
        let synthetic = self.config.input.is_none();
        if synthetic {
            if let Some(name) = generator.scenario.as_ref() {
                info!(
                    "scenario {}: {}",
                    name,
                    generator.description.as_deref().unwrap_or("no description")
                );
            }
        }
        let residuals = |pick: fn(&EstimateRecord) -> f64| -> Option<f64> {
            if !synthetic {
                return None;
            }
            let errors: Vec<f64> = records
                .iter()
                .map(|r| pick(r) - generator.truth_at(r.timestamp))
                .collect();
            Some(StatsHelper::rms(&errors))
        };
        let raw_rms_error = residuals(|r| r.measurement);
        let filtered_rms_error = residuals(|r| r.estimate);

        info!(
            "workflow processed {} samples, final estimate {:.4} (variance {:.6})",
            records.len(),
            latest.estimate,
            latest.variance
        );

        Ok(WorkflowResult {
            records,
            final_estimate: latest.estimate,
            final_variance: latest.variance,
            raw_rms_error,
            filtered_rms_error,
            metrics: session.metrics(),
        })
    }
}
