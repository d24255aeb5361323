use axum::http::{StatusCode, Uri};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, FailedResponse};
use crate::schema::EntityKind;

/// GET / - service information
pub async fn root() -> ApiResponse<Value> {
    let pages: Vec<String> = EntityKind::ALL
        .iter()
        .map(|kind| kind.schema().list_route())
        .collect();

    ApiResponse::success(json!({
        "name": "Zoo Admin",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Role-gated management dashboard for zoo staff, trainers, cages, areas and news",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "denied": "/denied (public)",
            "overview": "/admin, /staff, /trainer (role gated)",
            "pages": pages,
        }
    }))
}

/// GET /health - liveness; the remote store is not contacted
pub async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

/// The denied page. `requested` is the path the client asked for.
#[derive(Debug, Clone, Serialize)]
pub struct DeniedView {
    pub page: String,
    pub requested: String,
    pub title: &'static str,
    pub message: &'static str,
}

pub fn denied_view(denied_path: &str, requested: &str) -> DeniedView {
    DeniedView {
        page: denied_path.to_string(),
        requested: requested.to_string(),
        title: "Access denied",
        message: "You do not have permission to view this page.",
    }
}

/// GET /denied - the page itself; rewritten requests get the same body with 403
pub async fn denied(uri: Uri) -> FailedResponse<DeniedView> {
    ApiResponse::failure(denied_view(uri.path(), uri.path()), StatusCode::OK)
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No page at {}", uri.path()))
}
