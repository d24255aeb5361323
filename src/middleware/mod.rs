pub mod auth;
pub mod guard;
pub mod response;

pub use auth::{extract_bearer_token, session_middleware};
pub use guard::route_guard_middleware;
pub use response::{ApiResponse, FailedResponse};
