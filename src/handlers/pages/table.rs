use axum::{http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client_for;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::notify::{CollectingSink, Notification};
use crate::resource::ManagedRecord;
use crate::schema::{EntityKind, FacetSource};
use crate::server::AppState;
use crate::table::{FacetOption, TableController};

#[derive(Debug, Default, Deserialize)]
pub struct TableQuery {
    pub search: Option<String>,
    /// Selected facet value; empty means no filter
    pub facet: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TableRow {
    /// Edit page for this row
    pub route: String,
    #[serde(flatten)]
    pub record: ManagedRecord,
}

#[derive(Debug, Serialize)]
pub struct TableView {
    pub entity: EntityKind,
    pub title: &'static str,
    pub description: &'static str,
    pub heading: String,
    pub search: Option<String>,
    pub facet: Option<String>,
    pub facet_options: Vec<FacetOption>,
    pub rows: Vec<TableRow>,
    pub new_route: String,
    pub notifications: Vec<Notification>,
}

impl TableView {
    fn build(table: &TableController, query: TableQuery, notifications: Vec<Notification>) -> Self {
        let text = table.schema().text;
        let rows = table
            .visible_rows()
            .into_iter()
            .filter_map(|record| {
                let route = table.select_row(&record.id)?;
                Some(TableRow {
                    route,
                    record: record.clone(),
                })
            })
            .collect();

        Self {
            entity: table.kind(),
            title: text.list_title,
            description: text.list_description,
            heading: table.heading(),
            search: query.search,
            facet: query
                .facet
                .filter(|f| !f.trim().is_empty() && table.schema().facet != FacetSource::None),
            facet_options: table.facet_options(),
            rows,
            new_route: table.new_route(),
            notifications,
        }
    }
}

/// GET {list} - table view for one entity kind
pub async fn list(kind: EntityKind, state: AppState, query: TableQuery) -> Result<Response, ApiError> {
    let client = client_for(&state, kind)?;
    let sink = Arc::new(CollectingSink::new());
    let mut table = TableController::new(client, sink.clone());

    let loaded = table.load().await.map(|rows| rows.len());

    table.search(query.search.as_deref().unwrap_or_default());
    table.filter(query.facet.as_deref());
    let view = TableView::build(&table, query, sink.take().notifications);

    match loaded {
        Ok(count) => {
            tracing::debug!("{} table: {} loaded, {} visible", kind, count, view.rows.len());
            Ok(ApiResponse::success(view).into_response())
        }
        Err(e) => {
            let status = ApiError::from(e).status_code();
            let status = if status == StatusCode::NOT_FOUND { StatusCode::BAD_GATEWAY } else { status };
            Ok(ApiResponse::failure(view, status).into_response())
        }
    }
}
