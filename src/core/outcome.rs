//! Pipeline run outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Failure of a pipeline run, tagged with the stage that failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("step {stage_index} ({step}) failed: {reason}")]
pub struct StepFailure {
    /// Reason reported by the failing step
    pub reason: String,

    /// 0-based position of the failing step
    pub stage_index: usize,

    /// Name of the failing step
    pub step: String,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResult<T> {
    /// Every step succeeded; holds the last step's output
    Success(T),
    /// A step failed and the remaining steps were not run
    Failure(StepFailure),
}

impl<T> PipelineResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }

    /// The final value, if the run succeeded
    pub fn value(&self) -> Option<&T> {
        match self {
            PipelineResult::Success(value) => Some(value),
            PipelineResult::Failure(_) => None,
        }
    }

    /// The failure, if the run failed
    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            PipelineResult::Success(_) => None,
            PipelineResult::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, StepFailure> {
        match self {
            PipelineResult::Success(value) => Ok(value),
            PipelineResult::Failure(failure) => Err(failure),
        }
    }
}

impl<T> From<PipelineResult<T>> for Result<T, StepFailure> {
    fn from(result: PipelineResult<T>) -> Self {
        result.into_result()
    }
}

/// Overall status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Steps are still executing
    Running,
    /// Every step succeeded
    Completed,
    /// A step failed
    Failed,
}

/// Summary of a finished (or in-flight) pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Pipeline name
    pub pipeline: String,

    /// Run status
    pub status: RunStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of steps that succeeded
    pub steps_completed: usize,

    /// Total number of steps in the pipeline
    pub total_steps: usize,

    /// Failure details when status is `Failed`
    pub failure: Option<StepFailure>,
}

impl RunSummary {
    /// Start a new run summary
    pub fn start(pipeline: &str, total_steps: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline: pipeline.to_string(),
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
            steps_completed: 0,
            total_steps,
            failure: None,
        }
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run as failed
    pub fn fail(&mut self, failure: StepFailure) {
        self.status = RunStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.failure = Some(failure);
    }

    /// Fraction of steps that succeeded (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 1.0;
        }
        self.steps_completed as f64 / self.total_steps as f64
    }
}
