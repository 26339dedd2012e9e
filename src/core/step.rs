//! Step abstraction
//!
//! A step is one stage of a pipeline: an asynchronous function from the
//! previous stage's output to a new value, or a failure reason.

use crate::gateway::TransportError;
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;

/// Failure reason produced by a single step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct StepError {
    reason: String,
}

impl StepError {
    /// Create a step error with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The failure reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Take the failure reason by value
    pub fn into_reason(self) -> String {
        self.reason
    }
}

impl From<&str> for StepError {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for StepError {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

impl From<TransportError> for StepError {
    fn from(err: TransportError) -> Self {
        Self::new(err.message())
    }
}

/// One stage of a pipeline
///
/// Steps are stateless with respect to the pipeline: they are composed only by
/// their position and see nothing but the value handed to them.
#[async_trait]
pub trait Step<T: Send + 'static>: Send + Sync {
    /// Name used in logs, events and failure diagnostics
    fn name(&self) -> &str;

    /// Run the step against the previous stage's output
    async fn run(&self, input: T) -> Result<T, StepError>;
}

/// A step backed by an async closure
pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> FnStep<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> std::fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<T, F, Fut> Step<T> for FnStep<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, StepError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: T) -> Result<T, StepError> {
        (self.f)(input).await
    }
}

/// Build a step from a name and an async closure
pub fn step_fn<T, F, Fut>(name: impl Into<String>, f: F) -> FnStep<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, StepError>> + Send + 'static,
{
    FnStep::new(name, f)
}
