//! Gateway error types

use thiserror::Error;

/// Error types for data-access operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Record {0} not found")]
    NotFound(String),
}

impl TransportError {
    /// The message recorded by the store and shown to callers
    pub fn message(&self) -> String {
        self.to_string()
    }
}
