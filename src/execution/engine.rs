//! Main execution engine - runs a pipeline's steps in sequence

use crate::{
    core::{Pipeline, PipelineResult, RunSummary, StepFailure},
    execution::{ExecutionResult, StepExecutor},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        index: usize,
        step: String,
    },
    StepCompleted {
        index: usize,
        step: String,
        elapsed: Duration,
    },
    StepFailed {
        index: usize,
        step: String,
        reason: String,
        elapsed: Duration,
    },
    PipelineCompleted {
        summary: RunSummary,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Runs pipelines one step at a time, stopping at the first failure
///
/// Steps that already completed are not compensated when a later step fails.
#[derive(Clone, Default)]
pub struct ExecutionEngine {
    executor: StepExecutor,
    event_handlers: Vec<EventHandler>,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute the pipeline with the given initial input
    ///
    /// Step `i + 1` starts only after step `i` has resolved. An empty pipeline
    /// resolves to its input unchanged.
    pub async fn execute<T: Send + 'static>(
        &self,
        pipeline: &Pipeline<T>,
        input: T,
    ) -> PipelineResult<T> {
        let mut summary = RunSummary::start(&pipeline.name, pipeline.len());

        info!(
            "Starting pipeline: {} ({} steps, run {})",
            pipeline.name,
            pipeline.len(),
            summary.run_id
        );
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id: summary.run_id,
            pipeline_name: pipeline.name.clone(),
            total_steps: pipeline.len(),
        });

        let mut value = input;
        for (index, step) in pipeline.steps().iter().enumerate() {
            self.emit_event(ExecutionEvent::StepStarted {
                index,
                step: step.name().to_string(),
            });

            match self.executor.execute(&**step, index, value).await {
                ExecutionResult::Success { output, elapsed } => {
                    summary.steps_completed += 1;
                    self.emit_event(ExecutionEvent::StepCompleted {
                        index,
                        step: step.name().to_string(),
                        elapsed,
                    });
                    value = output;
                }
                ExecutionResult::Failed { error, elapsed } => {
                    let failure = StepFailure {
                        reason: error.into_reason(),
                        stage_index: index,
                        step: step.name().to_string(),
                    };
                    self.emit_event(ExecutionEvent::StepFailed {
                        index,
                        step: failure.step.clone(),
                        reason: failure.reason.clone(),
                        elapsed,
                    });

                    let skipped = pipeline.len() - index - 1;
                    warn!(
                        "Pipeline {} aborted at step {}; {} step(s) not run",
                        pipeline.name, index, skipped
                    );
                    summary.fail(failure.clone());
                    self.emit_event(ExecutionEvent::PipelineCompleted { summary });
                    return PipelineResult::Failure(failure);
                }
            }
        }

        summary.complete();
        info!("Pipeline finished: {} - {:?}", pipeline.name, summary.status);
        self.emit_event(ExecutionEvent::PipelineCompleted { summary });

        PipelineResult::Success(value)
    }
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("event_handlers", &self.event_handlers.len())
            .finish()
    }
}

/// Run a pipeline with a default engine
pub async fn run<T: Send + 'static>(pipeline: &Pipeline<T>, input: T) -> PipelineResult<T> {
    ExecutionEngine::new().execute(pipeline, input).await
}
