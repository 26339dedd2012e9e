//! Simulated steps for declarative workflows
//!
//! A simulated step stands in for a remote operation: it waits for a fixed
//! latency, then either fails with a configured message or resolves with a
//! rendered output value.

use crate::core::step::{Step, StepError};
use async_trait::async_trait;
use rand::Rng;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// Key that refers to the previous step's output
pub const INPUT_KEY: &str = "input";

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// Output shape with `{{ name }}` placeholders in its strings
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTemplate {
    shape: Value,
    variables: HashMap<String, String>,
}

impl OutputTemplate {
    pub fn new(shape: Value, variables: HashMap<String, String>) -> Self {
        Self { shape, variables }
    }

    /// Render the template against the previous step's output
    pub fn render(&self, input: &Value) -> Value {
        self.render_value(&self.shape, input)
    }

    fn render_value(&self, shape: &Value, input: &Value) -> Value {
        match shape {
            Value::String(text) => self.render_string(text, input),
            Value::Array(items) => {
                Value::Array(items.iter().map(|v| self.render_value(v, input)).collect())
            }
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.render_value(v, input)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn render_string(&self, text: &str, input: &Value) -> Value {
        // A bare `{{ input }}` keeps the input's type
        if let Some(caps) = placeholder().captures(text) {
            let whole = caps.get(0).map(|m| m.as_str().len() == text.len()).unwrap_or(false);
            if whole && &caps[1] == INPUT_KEY {
                return input.clone();
            }
        }

        let rendered = placeholder().replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            if key == INPUT_KEY {
                display_value(input)
            } else if let Some(value) = self.variables.get(key) {
                value.clone()
            } else {
                caps[0].to_string()
            }
        });

        Value::String(rendered.into_owned())
    }
}

/// Render a value the way it reads inside a message
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Arithmetic or structural change applied to a step's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Multiply a number
    Multiply(f64),
    /// Add to a number
    Add(f64),
    /// Merge fields into an object, or into every object of an array
    Merge(Map<String, Value>),
    /// Store `from * multiply` under `into`, on an object or every object of an array
    Derive {
        from: String,
        into: String,
        multiply: f64,
    },
}

impl Transform {
    pub fn apply(&self, value: Value) -> Result<Value, StepError> {
        match self {
            Transform::Multiply(factor) => numeric(value, |n| n * factor, "multiply"),
            Transform::Add(amount) => numeric(value, |n| n + amount, "add"),
            Transform::Merge(fields) => merge(value, fields),
            Transform::Derive {
                from,
                into,
                multiply,
            } => derive(value, from, into, *multiply),
        }
    }
}

fn numeric(value: Value, op: impl Fn(f64) -> f64, name: &str) -> Result<Value, StepError> {
    let Value::Number(number) = &value else {
        return Err(StepError::new(format!(
            "cannot {} non-numeric value {}",
            name, value
        )));
    };

    let result = number.as_f64().map(op).unwrap_or(f64::NAN);
    if result.fract() == 0.0 && result.abs() < i64::MAX as f64 && number.is_i64() {
        return Ok(Value::Number(Number::from(result as i64)));
    }
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| StepError::new(format!("{} produced a non-finite number", name)))
}

fn merge(value: Value, fields: &Map<String, Value>) -> Result<Value, StepError> {
    match value {
        Value::Object(mut object) => {
            object.extend(fields.clone());
            Ok(Value::Object(object))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| merge(item, fields))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(StepError::new(format!("cannot merge fields into {}", other))),
    }
}

fn derive(value: Value, from: &str, into: &str, factor: f64) -> Result<Value, StepError> {
    match value {
        Value::Object(mut object) => {
            let source = object.get(from).cloned().ok_or_else(|| {
                StepError::new(format!("cannot derive {}: field {} is missing", into, from))
            })?;
            let derived = numeric(source, |n| n * factor, "derive")?;
            object.insert(into.to_string(), derived);
            Ok(Value::Object(object))
        }
        Value::Array(items) => items
            .into_iter()
            .map(|item| derive(item, from, into, factor))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(StepError::new(format!("cannot derive {} from {}", into, other))),
    }
}

/// A step that simulates latency and random failure
#[derive(Debug, Clone)]
pub struct SimulatedStep {
    pub id: String,
    pub name: String,
    pub delay: Duration,
    /// Probability of success, 0.0 to 1.0
    pub success_rate: f64,
    pub output: Option<OutputTemplate>,
    pub transform: Option<Transform>,
    /// Reason reported on failure
    pub failure: String,
}

impl SimulatedStep {
    /// Create a step that always succeeds instantly and passes its input through
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            failure: format!("{} failed", name),
            name,
            delay: Duration::ZERO,
            success_rate: 1.0,
            output: None,
            transform: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the success rate, clamped to 0.0..=1.0 (NaN never succeeds)
    pub fn with_success_rate(mut self, success_rate: f64) -> Self {
        self.success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_output(mut self, output: OutputTemplate) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = failure.into();
        self
    }

    fn roll(&self) -> bool {
        if self.success_rate >= 1.0 {
            true
        } else if self.success_rate.is_nan() || self.success_rate <= 0.0 {
            false
        } else {
            rand::thread_rng().gen_bool(self.success_rate)
        }
    }
}

#[async_trait]
impl Step<Value> for SimulatedStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: Value) -> Result<Value, StepError> {
        debug!("Simulating {} for {:?}", self.id, self.delay);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if !self.roll() {
            warn!("Step {} rejected: {}", self.id, self.failure);
            return Err(StepError::new(self.failure.clone()));
        }

        let mut output = match &self.output {
            Some(template) => template.render(&input),
            None => input,
        };
        if let Some(transform) = &self.transform {
            output = transform.apply(output)?;
        }

        info!("{}: {}", self.name, display_value(&output));
        Ok(output)
    }
}
