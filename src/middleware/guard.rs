use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::access::AccessDecision;
use crate::handlers::public::denied_view;
use crate::middleware::ApiResponse;
use crate::server::AppState;
use crate::types::AuthenticatedSession;

/// Route guard middleware. Runs after [`super::session_middleware`].
///
/// A denied request is answered with the denied view in place of the page;
/// the URL the client asked for is left as it was.
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let session = request
        .extensions()
        .get::<AuthenticatedSession>()
        .cloned()
        .unwrap_or_default();

    match state.guard.evaluate(request.uri().path(), &session) {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::DenyRewrite { target } => {
            let view = denied_view(&target, request.uri().path());
            ApiResponse::failure(view, StatusCode::FORBIDDEN).into_response()
        }
    }
}
