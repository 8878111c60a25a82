//! Workflow file layout and loading.

use crate::generator::GeneratorConfig;
use anyhow::Context;
use kalmancore::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub session: SessionConfig,
    pub generator: GeneratorConfig,
    /// JSON-lines measurement file; replaces the generator when set.
    pub input: Option<PathBuf>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .session
            .validate()
            .with_context(|| format!("validating session in {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        initial_variance: f64,
        process_noise: f64,
        measurement_noise: f64,
        generator: GeneratorConfig,
    ) -> Self {
        Self {
            session: SessionConfig {
                initial_variance,
                process_noise,
                measurement_noise,
                ..Default::default()
            },
            generator,
            input: None,
        }
    }
}
