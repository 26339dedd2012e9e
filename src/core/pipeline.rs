//! Pipeline domain model

use crate::core::step::Step;
use std::sync::Arc;

/// A named, ordered sequence of steps
///
/// Each step consumes the output of the one before it. The first step
/// receives the run's initial input.
pub struct Pipeline<T: Send + 'static> {
    /// Pipeline name
    pub name: String,

    /// Optional human-readable description
    pub description: Option<String>,

    steps: Vec<Arc<dyn Step<T>>>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    /// Attach a human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step to the end of the pipeline
    pub fn step<S>(mut self, step: S) -> Self
    where
        S: Step<T> + 'static,
    {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step
    pub fn push(&mut self, step: Arc<dyn Step<T>>) {
        self.steps.push(step);
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Arc<dyn Step<T>>] {
        &self.steps
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the pipeline has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T: Send + 'static> Clone for Pipeline<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}
