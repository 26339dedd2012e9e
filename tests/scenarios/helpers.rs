//! Test utilities shared by the scenario tests

use async_trait::async_trait;
use stagecraft::gateway::{DataGateway, TransportError};
use stagecraft::store::{Record, RecordFields, RecordPatch};
use stagecraft::{Step, StepError};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Records which steps ran, in what order, and how many ran at once
#[derive(Clone, Default)]
pub struct Probe {
    log: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step that adds `amount` to its input
    pub fn adder(&self, name: &str, amount: i64) -> ProbeStep {
        ProbeStep {
            name: name.to_string(),
            probe: self.clone(),
            behavior: Behavior::Add(amount),
            delay: Duration::from_millis(5),
        }
    }

    /// Step that fails with `reason`
    pub fn failing(&self, name: &str, reason: &str) -> ProbeStep {
        ProbeStep {
            name: name.to_string(),
            probe: self.clone(),
            behavior: Behavior::Fail(reason.to_string()),
            delay: Duration::from_millis(5),
        }
    }

    /// Names of the steps that ran, in order
    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

enum Behavior {
    Add(i64),
    Fail(String),
}

pub struct ProbeStep {
    name: String,
    probe: Probe,
    behavior: Behavior,
    delay: Duration,
}

#[async_trait]
impl Step<i64> for ProbeStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: i64) -> Result<i64, StepError> {
        self.probe.log.lock().unwrap().push(self.name.clone());
        let now = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Add(amount) => Ok(input + amount),
            Behavior::Fail(reason) => Err(StepError::new(reason.clone())),
        }
    }
}

pub fn fields(name: &str, price: f64) -> RecordFields {
    RecordFields {
        name: name.to_string(),
        description: format!("{} description", name),
        price,
        category: "general".to_string(),
        stock: 10,
    }
}

pub fn record(id: &str, name: &str, price: f64) -> Record {
    Record::new(id, fields(name, price))
}

/// Gateway that returns queued responses, one per call
#[derive(Default)]
pub struct ScriptedGateway {
    fetches: Mutex<VecDeque<Result<Vec<Record>, TransportError>>>,
    creates: Mutex<VecDeque<Result<Record, TransportError>>>,
    patches: Mutex<VecDeque<Result<Record, TransportError>>>,
    patch_calls: Mutex<Vec<(String, RecordPatch)>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_fetch(&self, response: Result<Vec<Record>, TransportError>) {
        self.fetches.lock().unwrap().push_back(response);
    }

    pub fn on_create(&self, response: Result<Record, TransportError>) {
        self.creates.lock().unwrap().push_back(response);
    }

    pub fn on_patch(&self, response: Result<Record, TransportError>) {
        self.patches.lock().unwrap().push_back(response);
    }

    pub fn patch_calls(&self) -> Vec<(String, RecordPatch)> {
        self.patch_calls.lock().unwrap().clone()
    }
}

fn unscripted() -> TransportError {
    TransportError::Request("no scripted response".to_string())
}

#[async_trait]
impl DataGateway for ScriptedGateway {
    async fn fetch_all(&self) -> Result<Vec<Record>, TransportError> {
        let next = self.fetches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn create(&self, _candidate: RecordFields) -> Result<Record, TransportError> {
        let next = self.creates.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }

    async fn patch(&self, id: &str, patch: RecordPatch) -> Result<Record, TransportError> {
        self.patch_calls.lock().unwrap().push((id.to_string(), patch));
        let next = self.patches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(unscripted()))
    }
}

type FetchReply = Result<Vec<Record>, TransportError>;

/// Gateway whose fetches stay in flight until the test settles them
#[derive(Default)]
pub struct GatedGateway {
    pending: Mutex<VecDeque<oneshot::Receiver<FetchReply>>>,
    calls: AtomicUsize,
}

impl GatedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Prepare the next fetch; the returned sender settles it
    pub fn gate(&self) -> oneshot::Sender<FetchReply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn fetch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yield until `n` fetches have reached the gateway
    pub async fn wait_for_fetches(&self, n: usize) {
        while self.fetch_calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl DataGateway for GatedGateway {
    async fn fetch_all(&self) -> Result<Vec<Record>, TransportError> {
        let gate = self.pending.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Request("gate dropped".to_string()))),
            None => Err(unscripted()),
        }
    }

    async fn create(&self, _candidate: RecordFields) -> Result<Record, TransportError> {
        Err(unscripted())
    }

    async fn patch(&self, _id: &str, _patch: RecordPatch) -> Result<Record, TransportError> {
        Err(unscripted())
    }
}
