//! CRUD access to the remote collections, one client per entity kind.

pub mod http;
pub mod record;

pub use http::HttpResourceClient;
pub use record::ManagedRecord;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::schema::EntityKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Remote validation failed: {message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ResourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound(_))
    }
}

/// Single-attempt CRUD against one remote collection; no retries.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    fn kind(&self) -> EntityKind;

    async fn list(&self) -> Result<Vec<ManagedRecord>, ResourceError>;

    async fn get(&self, id: &str) -> Result<ManagedRecord, ResourceError>;

    async fn create(&self, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError>;

    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<ManagedRecord, ResourceError>;

    async fn delete(&self, id: &str) -> Result<(), ResourceError>;
}

#[derive(Clone, Default)]
pub struct ResourceRegistry {
    clients: HashMap<EntityKind, Arc<dyn ResourceClient>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(remote: &RemoteConfig) -> Result<Self, ResourceError> {
        let http = reqwest::Client::new();
        let mut registry = Self::new();

        for kind in EntityKind::ALL {
            let base = match kind {
                EntityKind::Staff => &remote.staff_url,
                EntityKind::TrainerAccount => &remote.trainer_url,
                EntityKind::Cage => &remote.cage_url,
                EntityKind::Area => &remote.area_url,
                EntityKind::NewsItem => &remote.news_url,
            };
            let client = HttpResourceClient::with_client(http.clone(), kind, base)?;
            registry.insert(Arc::new(client));
        }

        Ok(registry)
    }

    pub fn insert(&mut self, client: Arc<dyn ResourceClient>) {
        self.clients.insert(client.kind(), client);
    }

    pub fn client(&self, kind: EntityKind) -> Option<Arc<dyn ResourceClient>> {
        self.clients.get(&kind).cloned()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<_> = self.clients.keys().collect();
        f.debug_struct("ResourceRegistry").field("kinds", &kinds).finish()
    }
}
