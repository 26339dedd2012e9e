//! Data-access gateway
//!
//! The store talks to a remote source only through [`DataGateway`]. The
//! crate ships an in-memory implementation that simulates latency and
//! transport failures.

pub mod config;
pub mod error;
pub mod memory;

use crate::store::record::{Record, RecordFields, RecordPatch};
use async_trait::async_trait;
pub use config::GatewayConfig;
pub use error::TransportError;
pub use memory::InMemoryGateway;

/// Trait for data access - allows for different transports
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Load every record, in the source's order
    async fn fetch_all(&self) -> Result<Vec<Record>, TransportError>;

    /// Create a record; the source assigns its `id`
    async fn create(&self, candidate: RecordFields) -> Result<Record, TransportError>;

    /// Apply a partial update and return the full updated record
    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<Record, TransportError>;
}
