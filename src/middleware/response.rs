use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Wrapper for API responses that adds the `{ success, data }` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    /// Envelope with `success: false`, used when a page still renders but the
    /// action behind it failed
    pub fn failure(data: T, status_code: StatusCode) -> FailedResponse<T> {
        FailedResponse(Self::with_status(data, status_code))
    }
}

fn envelope<T: Serialize>(success: bool, status: StatusCode, data: &T) -> Response {
    let data_value = match serde_json::to_value(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to serialize response data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to serialize response data"
                })),
            )
                .into_response();
        }
    };

    (status, Json(json!({ "success": success, "data": data_value }))).into_response()
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        envelope(true, status, &self.data)
    }
}

#[derive(Debug)]
pub struct FailedResponse<T: Serialize>(ApiResponse<T>);

impl<T: Serialize> IntoResponse for FailedResponse<T> {
    fn into_response(self) -> Response {
        let status = self.0.status_code.unwrap_or(StatusCode::BAD_REQUEST);
        envelope(false, status, &self.0.data)
    }
}
