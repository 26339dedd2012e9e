//! Workflow configuration from YAML

use crate::core::{
    pipeline::Pipeline,
    simulated::{OutputTemplate, SimulatedStep, Transform},
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

/// Top-level workflow configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Workflow name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Initial input handed to the first step
    #[serde(default)]
    pub input: Value,

    /// Variables available to step output templates
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Default simulated latency for steps (in milliseconds)
    #[serde(default)]
    pub default_delay_ms: Option<u64>,

    /// Workflow steps, in execution order
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub id: String,

    /// Human-readable step name
    pub name: String,

    /// Simulated latency for this step (overrides the workflow default)
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// Probability that the step succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Output produced on success; strings may use `{{ input }}` and variables
    #[serde(default)]
    pub output: Option<Value>,

    /// Transform applied to the output
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub transform: Option<Transform>,

    /// Failure reason reported when the step fails
    #[serde(default)]
    pub failure: Option<String>,
}

fn default_success_rate() -> f64 {
    1.0
}

impl WorkflowConfig {
    /// Load workflow configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read workflow file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate workflow configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WorkflowConfig =
            serde_yaml::from_str(yaml).context("Failed to parse workflow YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the workflow configuration
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            bail!("Workflow '{}' has no steps", self.name);
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                bail!("Duplicate step id: {}", step.id);
            }
            if !(0.0..=1.0).contains(&step.success_rate) {
                bail!(
                    "Step '{}' has success_rate {} outside 0.0..=1.0",
                    step.id,
                    step.success_rate
                );
            }
        }

        Ok(())
    }

    /// Override a variable
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Build a runnable pipeline of simulated steps
    pub fn to_pipeline(&self) -> Pipeline<Value> {
        let mut pipeline = Pipeline::new(self.name.clone());
        if let Some(description) = &self.description {
            pipeline = pipeline.with_description(description.clone());
        }

        for step in &self.steps {
            pipeline = pipeline.step(self.build_step(step));
        }

        pipeline
    }

    fn build_step(&self, config: &StepConfig) -> SimulatedStep {
        let delay_ms = config.delay_ms.or(self.default_delay_ms).unwrap_or(0);
        let mut step = SimulatedStep::new(config.id.clone(), config.name.clone())
            .with_delay(Duration::from_millis(delay_ms))
            .with_success_rate(config.success_rate);

        if let Some(output) = &config.output {
            step = step.with_output(OutputTemplate::new(output.clone(), self.variables.clone()));
        }
        if let Some(transform) = &config.transform {
            step = step.with_transform(transform.clone());
        }
        if let Some(failure) = &config.failure {
            step = step.with_failure(failure.clone());
        }

        step
    }
}
