//! Create/edit/delete controller for one entity record.
//!
//! The mode (create or edit) is fixed when the controller is built. At most
//! one mutating request is in flight per controller; a second submit or
//! delete while one is running is rejected without touching the remote store.

pub mod draft;
pub mod state;

pub use draft::{form_text, posted_fields, FormDraft};
pub use state::{DeleteEvent, DeleteState, FormEvent, FormState};

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::notify::{Notification, UiSink};
use crate::resource::{ManagedRecord, ResourceClient, ResourceError};
use crate::schema::{EntityKind, EntitySchema, FAILURE_MESSAGE};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    #[error("{kind} has no field named '{field}'")]
    UnknownField { kind: EntityKind, field: String },

    #[error("another request is already in flight")]
    Busy,

    #[error("form already completed")]
    Closed,

    #[error("delete is only available when editing an existing record")]
    NotEditing,

    #[error("cannot {event} while {state}")]
    InvalidTransition { state: String, event: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit { id: String },
}

impl FormMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(ManagedRecord),
    /// Precondition failed; nothing was sent
    Invalid(BTreeMap<String, String>),
    Failed(ResourceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    Failed(ResourceError),
}

#[derive(Debug)]
struct Inner {
    draft: FormDraft,
    form: FormState,
    delete: DeleteState,
}

pub struct FormController {
    schema: &'static EntitySchema,
    mode: FormMode,
    client: Arc<dyn ResourceClient>,
    sink: Arc<dyn UiSink>,
    inner: Mutex<Inner>,
}

fn step_form(state: FormState, event: FormEvent) -> Result<FormState, FormError> {
    state.on(event).ok_or_else(|| FormError::InvalidTransition {
        state: format!("{:?}", state),
        event: format!("{:?}", event),
    })
}

fn step_delete(state: DeleteState, event: DeleteEvent) -> Result<DeleteState, FormError> {
    state.on(event).ok_or_else(|| FormError::InvalidTransition {
        state: format!("{:?}", state),
        event: format!("{:?}", event),
    })
}

impl FormController {
    fn build(mode: FormMode, draft: FormDraft, client: Arc<dyn ResourceClient>, sink: Arc<dyn UiSink>) -> Self {
        Self {
            schema: client.kind().schema(),
            mode,
            client,
            sink,
            inner: Mutex::new(Inner {
                draft,
                form: FormState::Idle,
                delete: DeleteState::Idle,
            }),
        }
    }

    pub fn create(client: Arc<dyn ResourceClient>, sink: Arc<dyn UiSink>) -> Self {
        let draft = FormDraft::empty(client.kind());
        Self::build(FormMode::Create, draft, client, sink)
    }

    pub fn edit(record: ManagedRecord, client: Arc<dyn ResourceClient>, sink: Arc<dyn UiSink>) -> Self {
        let draft = FormDraft::from_record(client.kind(), &record);
        Self::build(FormMode::Edit { id: record.id }, draft, client, sink)
    }

    /// Load the record behind a page id; `None` or `new` opens an empty form.
    ///
    /// A missing record degrades to create mode. A transport failure does the
    /// same but also raises one error notification.
    pub async fn open(client: Arc<dyn ResourceClient>, sink: Arc<dyn UiSink>, id: Option<&str>) -> Self {
        let id = id.map(str::trim).filter(|id| !id.is_empty() && *id != "new");

        let Some(id) = id else {
            return Self::create(client, sink);
        };

        match client.get(id).await {
            Ok(record) => Self::edit(record, client, sink),
            Err(ResourceError::NotFound(msg)) => {
                tracing::debug!("{}; opening create form instead", msg);
                Self::create(client, sink)
            }
            Err(e) => {
                tracing::warn!("Failed to load {} '{}': {}", client.kind(), id, e);
                sink.notify(Notification::error(FAILURE_MESSAGE));
                Self::create(client, sink)
            }
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub async fn state(&self) -> FormState {
        self.inner.lock().await.form
    }

    pub async fn delete_state(&self) -> DeleteState {
        self.inner.lock().await.delete
    }

    pub async fn draft(&self) -> FormDraft {
        self.inner.lock().await.draft.clone()
    }

    pub async fn set_field(&self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.inner.lock().await.draft.set(field, value)
    }

    /// Apply several values, stopping at the first unknown field
    pub async fn set_fields<I, K, V>(&self, values: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut inner = self.inner.lock().await;
        for (field, value) in values {
            inner.draft.set(field.as_ref(), value)?;
        }
        Ok(())
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        let payload = {
            let mut inner = self.inner.lock().await;

            if inner.delete == DeleteState::Deleting {
                return Err(FormError::Busy);
            }
            match inner.form {
                FormState::Submitting => return Err(FormError::Busy),
                FormState::Success => return Err(FormError::Closed),
                _ if inner.delete == DeleteState::Success => return Err(FormError::Closed),
                _ => {}
            }

            if !inner.draft.validate() {
                tracing::debug!("{} form rejected by validation: {:?}", self.kind(), inner.draft.validation_errors);
                return Ok(SubmitOutcome::Invalid(inner.draft.validation_errors.clone()));
            }

            inner.form = step_form(inner.form, FormEvent::Submit)?;
            inner.draft.payload()
        };

        // Lock released: the network call is the only suspension point
        let result = match &self.mode {
            FormMode::Create => self.client.create(&payload).await,
            FormMode::Edit { id } => self.client.update(id, &payload).await,
        };

        let mut inner = self.inner.lock().await;
        match result {
            Ok(record) => {
                inner.form = step_form(inner.form, FormEvent::Succeeded)?;
                drop(inner);

                let message = if self.mode.is_edit() {
                    self.schema.text.updated
                } else {
                    self.schema.text.created
                };
                self.sink.navigate(&self.schema.list_route());
                self.sink.notify(Notification::success(message));
                Ok(SubmitOutcome::Saved(record))
            }
            Err(e) => {
                tracing::warn!("Saving {} failed: {}", self.kind(), e);
                let failed = step_form(inner.form, FormEvent::Failed)?;
                inner.form = step_form(failed, FormEvent::Reset)?;
                if let ResourceError::Validation { field_errors, .. } = &e {
                    inner
                        .draft
                        .validation_errors
                        .extend(field_errors.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                drop(inner);

                self.sink.notify(Notification::error(FAILURE_MESSAGE));
                Ok(SubmitOutcome::Failed(e))
            }
        }
    }

    /// Open the confirmation step for deleting the loaded record
    pub async fn request_delete(&self) -> Result<(), FormError> {
        if !self.mode.is_edit() {
            return Err(FormError::NotEditing);
        }

        let mut inner = self.inner.lock().await;
        if inner.form == FormState::Submitting {
            return Err(FormError::Busy);
        }
        inner.delete = step_delete(inner.delete, DeleteEvent::Request)?;
        Ok(())
    }

    pub async fn cancel_delete(&self) -> Result<(), FormError> {
        let mut inner = self.inner.lock().await;
        inner.delete = step_delete(inner.delete, DeleteEvent::Cancel)?;
        Ok(())
    }

    pub async fn confirm_delete(&self) -> Result<DeleteOutcome, FormError> {
        let FormMode::Edit { id } = &self.mode else {
            return Err(FormError::NotEditing);
        };

        {
            let mut inner = self.inner.lock().await;
            if inner.form == FormState::Submitting || inner.delete == DeleteState::Deleting {
                return Err(FormError::Busy);
            }
            inner.delete = step_delete(inner.delete, DeleteEvent::Confirm)?;
        }

        let result = self.client.delete(id).await;

        let mut inner = self.inner.lock().await;
        match result {
            Ok(()) => {
                inner.delete = step_delete(inner.delete, DeleteEvent::Succeeded)?;
                drop(inner);

                self.sink.navigate(&self.schema.list_route());
                self.sink.notify(Notification::success(self.schema.text.deleted));
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::warn!("Deleting {} '{}' failed: {}", self.kind(), id, e);
                let failed = step_delete(inner.delete, DeleteEvent::Failed)?;
                inner.delete = step_delete(failed, DeleteEvent::Reset)?;
                drop(inner);

                self.sink.notify(Notification::error(self.schema.text.delete_failed));
                Ok(DeleteOutcome::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{CollectingSink, NotificationKind};
    use crate::testing::{MemoryResourceClient, RecordedCall};
    use serde_json::json;

    fn cage_fields() -> [(&'static str, &'static str); 3] {
        [("name", "Cage1"), ("maxCapacity", "10"), ("areaID", "A1")]
    }

    #[tokio::test]
    async fn create_mode_submits_once_and_navigates_to_list() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let sink = Arc::new(CollectingSink::new());
        let form = FormController::create(client.clone(), sink.clone());

        form.set_fields(cage_fields()).await.unwrap();
        let outcome = form.submit().await.unwrap();

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(
            client.calls(),
            vec![RecordedCall::Create(
                json!({"name": "Cage1", "maxCapacity": "10", "areaID": "A1"})
                    .as_object()
                    .cloned()
                    .unwrap()
            )]
        );

        let effects = sink.snapshot();
        assert_eq!(effects.navigations, vec!["/staff/manage-cage".to_string()]);
        assert_eq!(effects.notifications, vec![Notification::success("New cage added.")]);
        assert_eq!(form.state().await, FormState::Success);
    }

    #[tokio::test]
    async fn invalid_draft_makes_no_remote_call() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let sink = Arc::new(CollectingSink::new());
        let form = FormController::create(client.clone(), sink.clone());

        form.set_field("name", "Cage1").await.unwrap();
        let outcome = form.submit().await.unwrap();

        match outcome {
            SubmitOutcome::Invalid(errors) => {
                assert!(errors.contains_key("maxCapacity"));
                assert!(errors.contains_key("areaID"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(client.calls().is_empty());
        assert_eq!(sink.snapshot().notifications.len(), 0);
        assert_eq!(form.state().await, FormState::Idle);
    }

    #[tokio::test]
    async fn edit_mode_updates_the_loaded_record() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let id = client.seed(json!({"name": "Old", "maxCapacity": "4", "areaID": "B2"}));
        let sink = Arc::new(CollectingSink::new());

        let form = FormController::open(client.clone(), sink.clone(), Some(&id)).await;
        assert_eq!(form.mode(), &FormMode::Edit { id: id.clone() });
        assert_eq!(form.draft().await.value("name"), Some("Old"));

        form.set_field("name", "Renamed").await.unwrap();
        form.submit().await.unwrap();

        assert!(matches!(client.calls().last(), Some(RecordedCall::Update(updated, _)) if *updated == id));
        assert_eq!(sink.snapshot().notifications, vec![Notification::success("Cage updated.")]);
    }

    #[tokio::test]
    async fn missing_record_falls_back_to_create_mode() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Staff));
        let sink = Arc::new(CollectingSink::new());

        let form = FormController::open(client.clone(), sink.clone(), Some("404")).await;
        assert_eq!(form.mode(), &FormMode::Create);
        assert!(sink.snapshot().notifications.is_empty());

        let new_form = FormController::open(client, sink, Some("new")).await;
        assert_eq!(new_form.mode(), &FormMode::Create);
    }

    #[tokio::test]
    async fn transport_failure_on_load_notifies_once() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Staff));
        client.fail_next("connection reset");
        let sink = Arc::new(CollectingSink::new());

        let form = FormController::open(client, sink.clone(), Some("1")).await;
        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(sink.snapshot().notifications, vec![Notification::error(FAILURE_MESSAGE)]);
    }

    #[tokio::test]
    async fn remote_failure_returns_to_idle_and_allows_retry() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let sink = Arc::new(CollectingSink::new());
        let form = FormController::create(client.clone(), sink.clone());
        form.set_fields(cage_fields()).await.unwrap();

        client.fail_next("503");
        let first = form.submit().await.unwrap();
        assert!(matches!(first, SubmitOutcome::Failed(ResourceError::Transport(_))));
        assert_eq!(form.state().await, FormState::Idle);
        assert!(sink.snapshot().navigations.is_empty());

        let second = form.submit().await.unwrap();
        assert!(matches!(second, SubmitOutcome::Saved(_)));

        let kinds: Vec<_> = sink.snapshot().notifications.iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Error, NotificationKind::Success]);
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected_while_in_flight() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let gate = client.hold_requests();
        let sink = Arc::new(CollectingSink::new());
        let form = Arc::new(FormController::create(client.clone(), sink.clone()));
        form.set_fields(cage_fields()).await.unwrap();

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.submit().await }
        });

        while form.state().await != FormState::Submitting {
            tokio::task::yield_now().await;
        }
        assert_eq!(form.submit().await, Err(FormError::Busy));

        gate.release();
        assert!(matches!(first.await.unwrap(), Ok(SubmitOutcome::Saved(_))));
        assert_eq!(client.calls().len(), 1);
        assert_eq!(form.submit().await, Err(FormError::Closed));
    }

    #[tokio::test]
    async fn delete_needs_confirmation_and_navigates_on_success() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Staff));
        let id = client.seed(json!({"fullName": "Lan", "isDeleted": "0"}));
        let sink = Arc::new(CollectingSink::new());
        let form = FormController::open(client.clone(), sink.clone(), Some(&id)).await;

        assert!(matches!(form.confirm_delete().await, Err(FormError::InvalidTransition { .. })));

        form.request_delete().await.unwrap();
        form.cancel_delete().await.unwrap();
        assert_eq!(form.delete_state().await, DeleteState::Cancelled);
        assert!(client.calls().iter().all(|c| !matches!(c, RecordedCall::Delete(_))));

        form.request_delete().await.unwrap();
        assert_eq!(form.confirm_delete().await.unwrap(), DeleteOutcome::Deleted);

        assert_eq!(client.calls().last(), Some(&RecordedCall::Delete(id)));
        let effects = sink.snapshot();
        assert_eq!(effects.redirect(), Some("/admin/manage-staffs"));
        assert_eq!(effects.notifications, vec![Notification::success("Staff account deleted.")]);
        assert_eq!(form.submit().await, Err(FormError::Closed));
    }

    #[tokio::test]
    async fn failed_delete_notifies_and_returns_to_idle() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::Cage));
        let id = client.seed(json!({"name": "C", "maxCapacity": "1", "areaID": "A"}));
        let sink = Arc::new(CollectingSink::new());
        let form = FormController::open(client.clone(), sink.clone(), Some(&id)).await;

        form.request_delete().await.unwrap();
        client.fail_next("timeout");
        assert!(matches!(form.confirm_delete().await.unwrap(), DeleteOutcome::Failed(_)));

        assert_eq!(form.delete_state().await, DeleteState::Idle);
        assert_eq!(sink.snapshot().notifications, vec![Notification::error("Fail to delete.")]);
        assert!(sink.snapshot().navigations.is_empty());
    }

    #[tokio::test]
    async fn create_form_cannot_delete() {
        let client = Arc::new(MemoryResourceClient::new(EntityKind::NewsItem));
        let form = FormController::create(client, Arc::new(CollectingSink::new()));
        assert_eq!(form.request_delete().await, Err(FormError::NotEditing));
    }
}
