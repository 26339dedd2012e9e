//! Request lifecycle state
//!
//! `RequestState` only changes through the transition methods below. Each
//! one corresponds to an operation starting or settling.

use crate::store::record::Record;
use serde::{Deserialize, Serialize};

/// Lifecycle of the shared fetch request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// No fetch has been dispatched since start or reset
    #[default]
    Idle,
    /// A fetch is in flight
    Pending,
    /// The last fetch to settle succeeded
    Succeeded,
    /// The last fetch to settle failed
    Failed,
}

/// Records plus the status of the request that loads them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestState {
    /// Records in insertion order
    pub items: Vec<Record>,

    /// Status of the shared fetch request
    pub status: RequestStatus,

    /// Reason of the last failed fetch; set only when `status` is `Failed`
    pub error: Option<String>,
}

impl RequestState {
    /// The initial state: no items, idle, no error
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetch was dispatched
    pub fn begin_fetch(&mut self) {
        self.status = RequestStatus::Pending;
        self.error = None;
    }

    /// A fetch resolved; its payload replaces the items wholesale
    pub fn fetch_succeeded(&mut self, items: Vec<Record>) {
        self.status = RequestStatus::Succeeded;
        self.error = None;
        self.items = items;
    }

    /// A fetch rejected; items are left as they were
    pub fn fetch_failed(&mut self, reason: impl Into<String>) {
        self.status = RequestStatus::Failed;
        self.error = Some(reason.into());
    }

    /// A create resolved; the new record goes to the end
    pub fn record_added(&mut self, record: Record) {
        self.items.push(record);
    }

    /// An update resolved; replaces the record with the same id in place
    ///
    /// Returns `false` and changes nothing when no record has that id.
    pub fn record_updated(&mut self, record: Record) -> bool {
        match self.items.iter().position(|r| r.id == record.id) {
            Some(index) => {
                self.items[index] = record;
                true
            }
            None => false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Find a record by id
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.items.iter().find(|r| r.id == id)
    }
}
