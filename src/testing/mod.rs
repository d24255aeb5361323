use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use crate::resource::{ManagedRecord, ResourceClient, ResourceError};
use crate::schema::EntityKind;

/// One call observed by [`MemoryResourceClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    List,
    Get(String),
    Create(Map<String, Value>),
    Update(String, Map<String, Value>),
    Delete(String),
}

/// Blocks every request on the client until released
#[derive(Debug, Clone)]
pub struct Gate(Arc<Semaphore>);

impl Gate {
    pub fn release(&self) {
        self.0.close();
    }
}

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    records: Vec<ManagedRecord>,
    calls: Vec<RecordedCall>,
    fail_next: Option<String>,
    gate: Option<Arc<Semaphore>>,
}

/// In-memory collection that records every call, for controller tests
#[derive(Debug)]
pub struct MemoryResourceClient {
    kind: EntityKind,
    store: Mutex<Store>,
}

impl MemoryResourceClient {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            store: Mutex::new(Store {
                next_id: 1,
                ..Store::default()
            }),
        }
    }

    /// Insert a record without recording a call; returns its id
    pub fn seed(&self, fields: Value) -> String {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id.to_string();
        store.next_id += 1;
        let fields = fields.as_object().cloned().unwrap_or_default();
        store.records.push(ManagedRecord::new(id.clone(), fields));
        id
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn records(&self) -> Vec<ManagedRecord> {
        self.store.lock().unwrap().records.clone()
    }

    /// The next call fails with a transport error
    pub fn fail_next(&self, message: &str) {
        self.store.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn hold_requests(&self) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.store.lock().unwrap().gate = Some(semaphore.clone());
        Gate(semaphore)
    }

    async fn enter(&self, call: RecordedCall) -> Result<(), ResourceError> {
        let gate = {
            let mut store = self.store.lock().unwrap();
            store.calls.push(call);
            store.gate.clone()
        };

        if let Some(gate) = gate {
            // Closed semaphore means released
            let _ = gate.acquire().await;
        }

        match self.store.lock().unwrap().fail_next.take() {
            Some(message) => Err(ResourceError::Transport(message)),
            None => Ok(()),
        }
    }

    fn find(&self, id: &str) -> Result<ManagedRecord, ResourceError> {
        self.store
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(format!("{} '{}'", self.kind, id)))
    }
}

#[async_trait]
impl ResourceClient for MemoryResourceClient {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn list(&self) -> Result<Vec<ManagedRecord>, ResourceError> {
        self.enter(RecordedCall::List).await?;
        Ok(self.records())
    }

    async fn get(&self, id: &str) -> Result<ManagedRecord, ResourceError> {
        self.enter(RecordedCall::Get(id.to_string())).await?;
        self.find(id)
    }

    async fn create(&self, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError> {
        self.enter(RecordedCall::Create(fields.clone())).await?;

        let mut store = self.store.lock().unwrap();
        let id = store.next_id.to_string();
        store.next_id += 1;
        let mut record = ManagedRecord::new(id, fields.clone());
        if record.is_deleted.is_none() {
            record.is_deleted = Some("false".to_string());
        }
        store.records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError> {
        self.enter(RecordedCall::Update(id.to_string(), fields.clone())).await?;

        let mut store = self.store.lock().unwrap();
        let record = store
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ResourceError::NotFound(format!("{} '{}'", self.kind, id)))?;
        record.merge(fields.clone());
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.enter(RecordedCall::Delete(id.to_string())).await?;

        let mut store = self.store.lock().unwrap();
        let before = store.records.len();
        store.records.retain(|r| r.id != id);
        if store.records.len() == before {
            return Err(ResourceError::NotFound(format!("{} '{}'", self.kind, id)));
        }
        Ok(())
    }
}
