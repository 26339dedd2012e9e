//! Request-lifecycle store
//!
//! `RecordStore` owns a `RequestState` and mutates it only through its
//! operations, each of which wraps one call to a [`DataGateway`].
//!
//! The state is never locked across a gateway call. Overlapping operations
//! are not excluded: whichever settles last writes last, so a slow
//! `fetch_all` can overwrite the outcome of a newer one.

pub mod record;
pub mod state;

pub use record::{Record, RecordFields, RecordPatch};
pub use state::{RequestState, RequestStatus};

use crate::gateway::{DataGateway, TransportError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

struct StoreInner {
    gateway: Arc<dyn DataGateway>,
    state: watch::Sender<RequestState>,
}

/// Shared handle to the record store
///
/// Cloning is cheap; clones observe and mutate the same state.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<StoreInner>,
}

impl RecordStore {
    /// Create a store in its initial state
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        let (state, _) = watch::channel(RequestState::new());
        Self {
            inner: Arc::new(StoreInner { gateway, state }),
        }
    }

    /// The gateway this store dispatches to
    pub fn gateway(&self) -> &Arc<dyn DataGateway> {
        &self.inner.gateway
    }

    /// A copy of the current state
    pub fn snapshot(&self) -> RequestState {
        self.inner.state.borrow().clone()
    }

    /// Watch every state transition
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.inner.state.subscribe()
    }

    /// Load all records, replacing the current items on success
    ///
    /// Failures are recorded in the shared `error` field rather than returned.
    pub async fn fetch_all(&self) -> RequestStatus {
        self.inner.state.send_modify(|state| state.begin_fetch());
        debug!("fetch_all dispatched");

        match self.inner.gateway.fetch_all().await {
            Ok(items) => {
                info!("fetch_all succeeded with {} records", items.len());
                self.inner
                    .state
                    .send_modify(|state| state.fetch_succeeded(items));
                RequestStatus::Succeeded
            }
            Err(err) => {
                warn!("fetch_all failed: {}", err);
                self.inner
                    .state
                    .send_modify(|state| state.fetch_failed(err.message()));
                RequestStatus::Failed
            }
        }
    }

    /// Create a record and append it to the items
    ///
    /// Errors go to the caller only; `status` and `error` are untouched.
    pub async fn add(&self, candidate: RecordFields) -> Result<Record, TransportError> {
        let record = self.inner.gateway.create(candidate).await.map_err(|err| {
            warn!("add failed: {}", err);
            err
        })?;

        info!("Record {} added", record.id);
        let added = record.clone();
        self.inner.state.send_modify(|state| state.record_added(added));
        Ok(record)
    }

    /// Patch a record and replace it in place
    ///
    /// When no local record has `id`, the gateway's result is returned but the
    /// items are left unchanged.
    pub async fn update(&self, id: &str, patch: RecordPatch) -> Result<Record, TransportError> {
        let record = self.inner.gateway.patch(id, patch).await.map_err(|err| {
            warn!("update of {} failed: {}", id, err);
            err
        })?;

        let updated = record.clone();
        let replaced = self
            .inner
            .state
            .send_if_modified(|state| state.record_updated(updated));
        if replaced {
            info!("Record {} updated", record.id);
        } else {
            debug!("Record {} not loaded locally; update dropped", record.id);
        }
        Ok(record)
    }

    /// Restore the initial state
    pub fn reset(&self) {
        self.inner
            .state
            .send_modify(|state| *state = RequestState::default());
        debug!("Store reset");
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}
