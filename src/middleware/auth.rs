use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::decode_jwt;
use crate::server::AppState;
use crate::types::AuthenticatedSession;

/// Session middleware: decodes the bearer token into an [`AuthenticatedSession`]
/// request extension.
///
/// A missing or unusable token never rejects the request here. It yields an
/// anonymous session and the route guard decides what that session may see.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match extract_bearer_token(request.headers()) {
        Ok(None) => AuthenticatedSession::anonymous(),
        Ok(Some(token)) => match decode_jwt(&token, &state.jwt_secret) {
            Ok(claims) => claims.into_session(),
            Err(e) => {
                tracing::warn!("Ignoring session token on {}: {}", request.uri().path(), e);
                AuthenticatedSession::anonymous()
            }
        },
        Err(msg) => {
            tracing::warn!("Ignoring Authorization header on {}: {}", request.uri().path(), msg);
            AuthenticatedSession::anonymous()
        }
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Extract the JWT from the Authorization header; `Ok(None)` when absent
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_is_not_an_error() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Ok(Some("abc.def.ghi".to_string())));

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
