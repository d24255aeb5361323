//! List controller: loads a whole collection and filters it locally.
//!
//! Search and facet filtering never go back to the remote store; they work on
//! whatever the last `load` returned.

pub mod facet;

pub use facet::{derive_facets, FacetOption};

use std::sync::Arc;

use crate::notify::{Notification, UiSink};
use crate::resource::{ManagedRecord, ResourceClient, ResourceError};
use crate::schema::{EntityKind, EntitySchema, FacetSource, FAILURE_MESSAGE};

pub struct TableController {
    schema: &'static EntitySchema,
    client: Arc<dyn ResourceClient>,
    sink: Arc<dyn UiSink>,
    records: Vec<ManagedRecord>,
    search: String,
    facet: Option<String>,
}

impl TableController {
    pub fn new(client: Arc<dyn ResourceClient>, sink: Arc<dyn UiSink>) -> Self {
        Self {
            schema: client.kind().schema(),
            client,
            sink,
            records: Vec::new(),
            search: String::new(),
            facet: None,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Fetch the collection; on failure the previous rows stay and one error
    /// notification is raised.
    pub async fn load(&mut self) -> Result<&[ManagedRecord], ResourceError> {
        match self.client.list().await {
            Ok(records) => {
                tracing::debug!("Loaded {} {} records", records.len(), self.kind());
                self.records = records;
                Ok(&self.records)
            }
            Err(e) => {
                tracing::warn!("Listing {} failed: {}", self.kind(), e);
                self.sink.notify(Notification::error(FAILURE_MESSAGE));
                Err(e)
            }
        }
    }

    pub fn records(&self) -> &[ManagedRecord] {
        &self.records
    }

    /// Heading shown above the table, e.g. `Trainer (3)`
    pub fn heading(&self) -> String {
        format!("{} ({})", self.schema.text.list_title, self.records.len())
    }

    pub fn facet_options(&self) -> Vec<FacetOption> {
        match self.schema.facet {
            FacetSource::None => Vec::new(),
            FacetSource::Status => facet::status_options(),
            FacetSource::Distinct(field) => derive_facets(&self.records, field)
                .into_iter()
                .map(|value| FacetOption::new(value.clone(), value))
                .collect(),
        }
    }

    pub fn search(&mut self, term: &str) {
        self.search = term.trim().to_lowercase();
    }

    /// Select a facet value; `None` clears it. Ignored for kinds without facets.
    pub fn filter(&mut self, value: Option<&str>) {
        self.facet = match self.schema.facet {
            FacetSource::None => None,
            _ => value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string),
        };
    }

    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.facet = None;
    }

    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || self.facet.is_some()
    }

    fn matches_search(&self, record: &ManagedRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let Some(value) = record.get(self.schema.search_key) else {
            return false;
        };
        let text = match value {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        text.to_lowercase().contains(&self.search)
    }

    fn matches_facet(&self, record: &ManagedRecord) -> bool {
        let Some(selected) = self.facet.as_deref() else {
            return true;
        };
        match self.schema.facet {
            FacetSource::None => true,
            FacetSource::Status => {
                let wanted = facet::canonical_status(selected);
                let actual = record.is_deleted.as_deref().and_then(facet::canonical_status);
                wanted.is_some() && wanted == actual
            }
            FacetSource::Distinct(field) => facet::has_value(record, field, selected),
        }
    }

    /// Rows left after search and facet filtering, in load order
    pub fn visible_rows(&self) -> Vec<&ManagedRecord> {
        self.records
            .iter()
            .filter(|r| self.matches_search(r) && self.matches_facet(r))
            .collect()
    }

    /// Edit route for a loaded row; unknown ids select nothing
    pub fn select_row(&self, id: &str) -> Option<String> {
        self.records
            .iter()
            .any(|r| r.id == id)
            .then(|| self.schema.edit_route(id))
    }

    pub fn new_route(&self) -> String {
        self.schema.new_route()
    }
}
