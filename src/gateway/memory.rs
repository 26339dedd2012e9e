//! In-memory gateway that behaves like a remote record source

use crate::gateway::{DataGateway, GatewayConfig, TransportError};
use crate::store::record::{Record, RecordFields, RecordPatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Simulated remote source holding records in memory
///
/// Every call waits for the configured latency, then may fail at random
/// (`failure_rate`) or because a failure was queued with [`fail_next`].
///
/// [`fail_next`]: InMemoryGateway::fail_next
pub struct InMemoryGateway {
    config: GatewayConfig,
    records: RwLock<Vec<Record>>,
    queued_failures: Mutex<VecDeque<String>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            config,
            records: RwLock::new(Vec::new()),
            queued_failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Seed the source with existing records
    ///
    /// Seed records are validated and must have distinct ids.
    pub fn with_records(mut self, records: Vec<Record>) -> Result<Self> {
        validate_seed(&records)?;
        self.records = RwLock::new(records);
        Ok(self)
    }

    /// Load seed records from a YAML or JSON file
    pub fn from_seed_file(path: impl AsRef<Path>, config: GatewayConfig) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        // YAML is a superset of JSON
        let records: Vec<Record> =
            serde_yaml::from_str(&content).context("Failed to parse seed records")?;

        Self::with_config(config)
            .with_records(records)
            .with_context(|| format!("Invalid seed file {}", path.display()))
    }

    /// Make the next call fail with `message`
    pub fn fail_next(&self, message: impl Into<String>) {
        self.queued_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(message.into());
    }

    /// Number of records held by the source
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn simulate_transport(&self, operation: &str) -> Result<(), TransportError> {
        let latency = self.config.latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let queued = self
            .queued_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(message) = queued {
            debug!("{} failing with queued error", operation);
            return Err(TransportError::Request(message));
        }

        let rate = self.config.failure_rate;
        if rate >= 1.0 || (rate > 0.0 && rand::thread_rng().gen_bool(rate)) {
            debug!("{} failing with simulated error", operation);
            return Err(TransportError::Request(format!("Failed to {}", operation)));
        }

        Ok(())
    }
}

fn validate_seed(records: &[Record]) -> Result<()> {
    let mut ids = HashSet::new();
    for record in records {
        record
            .fields
            .validate()
            .map_err(|reason| anyhow::anyhow!("Seed record {}: {}", record.id, reason))?;
        if !ids.insert(record.id.as_str()) {
            anyhow::bail!("Duplicate seed record id: {}", record.id);
        }
    }
    Ok(())
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataGateway for InMemoryGateway {
    async fn fetch_all(&self) -> Result<Vec<Record>, TransportError> {
        self.simulate_transport("fetch records").await?;
        Ok(self.records.read().await.clone())
    }

    async fn create(&self, candidate: RecordFields) -> Result<Record, TransportError> {
        self.simulate_transport("add record").await?;
        candidate.validate().map_err(TransportError::InvalidRecord)?;

        let record = Record::new(Uuid::new_v4().to_string(), candidate);
        self.records.write().await.push(record.clone());
        debug!("Created record {}", record.id);
        Ok(record)
    }

    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<Record, TransportError> {
        self.simulate_transport("update record").await?;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| TransportError::NotFound(id.to_string()))?;

        let mut fields = record.fields.clone();
        patch.apply_to(&mut fields);
        fields.validate().map_err(TransportError::InvalidRecord)?;

        record.fields = fields;
        Ok(record.clone())
    }
}
