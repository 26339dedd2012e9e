//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{run, EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::{ExecutionResult, StepExecutor};
