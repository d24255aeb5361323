use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{client_for, is_new};
use crate::error::ApiError;
use crate::form::{posted_fields, DeleteOutcome, FormController, FormError, FormMode, SubmitOutcome};
use crate::middleware::ApiResponse;
use crate::notify::{CollectingSink, Effects, Notification, UiSink};
use crate::resource::{ManagedRecord, ResourceError};
use crate::schema::{EntityKind, FieldKind, FAILURE_MESSAGE};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub entity: EntityKind,
    #[serde(flatten)]
    pub mode: FormMode,
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
    /// Where the form posts to; create forms always post to `new`
    pub submit_route: String,
    pub fields: Vec<FieldView>,
    pub can_delete: bool,
    pub notifications: Vec<Notification>,
}

impl FormView {
    async fn build(form: &FormController, notifications: Vec<Notification>) -> Self {
        let schema = form.schema();
        let draft = form.draft().await;

        let fields = schema
            .fields
            .iter()
            .map(|spec| FieldView {
                name: spec.name,
                label: spec.label,
                kind: spec.kind,
                required: spec.required,
                max_len: spec.max_len,
                value: draft.value(spec.name).unwrap_or_default().to_string(),
                error: draft.validation_errors.get(spec.name).cloned(),
            })
            .collect();

        let (title, description, action, submit_route) = match form.mode() {
            FormMode::Create => (
                schema.text.create_title,
                schema.text.create_description,
                "Create",
                schema.new_route(),
            ),
            FormMode::Edit { id } => (
                schema.text.edit_title,
                schema.text.edit_description,
                "Save changes",
                schema.edit_route(id),
            ),
        };

        Self {
            entity: form.kind(),
            mode: form.mode().clone(),
            title,
            description,
            action,
            submit_route,
            fields,
            can_delete: form.mode().is_edit(),
            notifications,
        }
    }
}

/// Result of a submit or delete
#[derive(Debug, Serialize)]
pub struct ActionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ManagedRecord>,
    pub notifications: Vec<Notification>,
    pub redirect: Option<String>,
    pub validation_errors: BTreeMap<String, String>,
}

impl ActionView {
    fn new(record: Option<ManagedRecord>, effects: Effects, validation_errors: BTreeMap<String, String>) -> Self {
        Self {
            record,
            redirect: effects.redirect().map(str::to_string),
            notifications: effects.notifications,
            validation_errors,
        }
    }
}

fn remote_failure_status(err: ResourceError) -> StatusCode {
    ApiError::from(err).status_code()
}

/// GET {list}/:id - form view; unknown ids open in create mode
pub async fn view(kind: EntityKind, state: AppState, id: String) -> Result<ApiResponse<FormView>, ApiError> {
    let client = client_for(&state, kind)?;
    let sink = Arc::new(CollectingSink::new());

    let form = FormController::open(client, sink.clone(), Some(&id)).await;
    let view = FormView::build(&form, sink.take().notifications).await;

    Ok(ApiResponse::success(view))
}

/// POST {list}/:id - validate and save
pub async fn submit(
    kind: EntityKind,
    state: AppState,
    id: String,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(values) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let client = client_for(&state, kind)?;
    let sink = Arc::new(CollectingSink::new());

    let (form, loaded, _claim) = if is_new(&id) {
        (FormController::create(client, sink.clone()), None, None)
    } else {
        let claim = state.in_flight.try_claim(kind, &id).ok_or(FormError::Busy)?;
        let record = match client.get(&id).await {
            Ok(record) => record,
            Err(err @ ResourceError::NotFound(_)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!("Failed to load {} '{}' for submit: {}", kind, id, err);
                sink.notify(Notification::error(FAILURE_MESSAGE));
                let view = ActionView::new(None, sink.take(), BTreeMap::new());
                return Ok(ApiResponse::failure(view, remote_failure_status(err)).into_response());
            }
        };
        let form = FormController::edit(record.clone(), client, sink.clone());
        (form, Some(record), Some(claim))
    };

    form.set_fields(posted_fields(kind, loaded.as_ref(), &values)).await?;

    let outcome = form.submit().await?;
    let effects = sink.take();

    let response = match outcome {
        SubmitOutcome::Saved(record) => {
            let view = ActionView::new(Some(record), effects, BTreeMap::new());
            if form.mode().is_edit() {
                ApiResponse::success(view).into_response()
            } else {
                ApiResponse::created(view).into_response()
            }
        }
        SubmitOutcome::Invalid(errors) => {
            ApiResponse::failure(ActionView::new(None, effects, errors), StatusCode::UNPROCESSABLE_ENTITY)
                .into_response()
        }
        SubmitOutcome::Failed(err) => {
            let errors = form.draft().await.validation_errors;
            let status = remote_failure_status(err);
            ApiResponse::failure(ActionView::new(None, effects, errors), status).into_response()
        }
    };

    Ok(response)
}

/// DELETE {list}/:id - the request itself is the confirmation
pub async fn delete(kind: EntityKind, state: AppState, id: String) -> Result<Response, ApiError> {
    if is_new(&id) {
        return Err(FormError::NotEditing.into());
    }

    let client = client_for(&state, kind)?;
    let _claim = state.in_flight.try_claim(kind, &id).ok_or(FormError::Busy)?;
    let sink = Arc::new(CollectingSink::new());

    // Deleting needs only the id, not the loaded field values
    let form = FormController::edit(ManagedRecord::new(id.as_str(), Map::new()), client, sink.clone());
    form.request_delete().await?;
    let outcome = form.confirm_delete().await?;
    let effects = sink.take();

    let response = match outcome {
        DeleteOutcome::Deleted => ApiResponse::success(ActionView::new(None, effects, BTreeMap::new())).into_response(),
        DeleteOutcome::Failed(err) => {
            let status = remote_failure_status(err);
            ApiResponse::failure(ActionView::new(None, effects, BTreeMap::new()), status).into_response()
        }
    };

    Ok(response)
}
