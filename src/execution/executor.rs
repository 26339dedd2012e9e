//! Step executor - runs a single step

use crate::core::{Step, StepError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Result of executing one step
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult<T> {
    /// Step resolved with an output
    Success { output: T, elapsed: Duration },
    /// Step rejected with a reason
    Failed { error: StepError, elapsed: Duration },
}

impl<T> ExecutionResult<T> {
    pub fn elapsed(&self) -> Duration {
        match self {
            ExecutionResult::Success { elapsed, .. } | ExecutionResult::Failed { elapsed, .. } => {
                *elapsed
            }
        }
    }
}

/// Executes a single step and times it
#[derive(Debug, Clone, Default)]
pub struct StepExecutor;

impl StepExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute a step against its input
    ///
    /// The step's future is awaited to completion; there is no timeout.
    pub async fn execute<T: Send + 'static>(
        &self,
        step: &dyn Step<T>,
        index: usize,
        input: T,
    ) -> ExecutionResult<T> {
        info!("Executing step {}: {}", index, step.name());
        let started = Instant::now();

        match step.run(input).await {
            Ok(output) => {
                let elapsed = started.elapsed();
                debug!("Step {} resolved in {:?}", step.name(), elapsed);
                ExecutionResult::Success { output, elapsed }
            }
            Err(err) => {
                let elapsed = started.elapsed();
                error!("Step {} ({}) failed: {}", index, step.name(), err);
                ExecutionResult::Failed {
                    error: err,
                    elapsed,
                }
            }
        }
    }
}
