//! stagecraft - sequential async step pipelines and a request-lifecycle store

pub mod cli;
pub mod core;
pub mod execution;
pub mod gateway;
pub mod store;

// Re-export commonly used types
pub use crate::core::{step_fn, Pipeline, PipelineResult, Step, StepError, StepFailure};
pub use execution::{run, ExecutionEngine, ExecutionEvent};
pub use gateway::{DataGateway, InMemoryGateway, TransportError};
pub use store::{Record, RecordFields, RecordPatch, RecordStore, RequestState, RequestStatus};
