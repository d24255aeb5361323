// handlers/pages - table and form endpoints for one managed entity
//
// GET    {list}            → table view (?search=&facet=)
// GET    {list}/:id        → form view; `new` opens an empty create form
// POST   {list}/:id        → submit the form
// DELETE {list}/:id        → confirmed delete
//
// Every request builds its own controller and a collecting sink; the effects
// the controller raised are returned in the response body.

pub mod form;
pub mod table;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::resource::ResourceClient;
use crate::schema::EntityKind;
use crate::server::AppState;

pub fn routes(kind: EntityKind) -> Router<AppState> {
    let list = kind.schema().list_route();
    let record = format!("{}/:id", list);

    Router::new()
        .route(
            &list,
            get(move |State(state): State<AppState>, Query(query): Query<table::TableQuery>| {
                table::list(kind, state, query)
            }),
        )
        .route(
            &record,
            get(move |State(state): State<AppState>, Path(id): Path<String>| form::view(kind, state, id))
                .post(
                    move |State(state): State<AppState>,
                          Path(id): Path<String>,
                          payload: Result<Json<Map<String, Value>>, JsonRejection>| {
                        form::submit(kind, state, id, payload)
                    },
                )
                .delete(move |State(state): State<AppState>, Path(id): Path<String>| {
                    form::delete(kind, state, id)
                }),
        )
}

fn client_for(state: &AppState, kind: EntityKind) -> Result<Arc<dyn ResourceClient>, ApiError> {
    state
        .registry
        .client(kind)
        .ok_or_else(|| ApiError::internal_server_error(format!("No remote client configured for {}", kind)))
}

fn is_new(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || id == "new"
}
