//! Router assembly and shared request state.

use axum::{http::HeaderValue, middleware, routing::get, Router};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::access::RouteGuard;
use crate::config::AppConfig;
use crate::handlers::{overview, pages, public};
use crate::middleware::{route_guard_middleware, session_middleware};
use crate::resource::{ResourceError, ResourceRegistry};
use crate::schema::EntityKind;

#[derive(Clone, Debug)]
pub struct AppState {
    pub guard: Arc<RouteGuard>,
    pub registry: ResourceRegistry,
    pub jwt_secret: String,
    pub in_flight: InFlight,
    pub request_logging: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(guard: RouteGuard, registry: ResourceRegistry, jwt_secret: impl Into<String>) -> Self {
        Self {
            guard: Arc::new(guard),
            registry,
            jwt_secret: jwt_secret.into(),
            in_flight: InFlight::default(),
            request_logging: true,
            enable_cors: false,
            cors_origins: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ResourceError> {
        let registry = ResourceRegistry::from_config(&config.remote)?;
        let mut state = Self::new(
            RouteGuard::from_config(&config.guard),
            registry,
            config.security.jwt_secret.clone(),
        );
        state.request_logging = config.server.enable_request_logging;
        state.enable_cors = config.security.enable_cors;
        state.cors_origins = config.security.cors_origins.clone();
        Ok(state)
    }
}

/// Record ids with a mutating request currently running against them
#[derive(Clone, Debug, Default)]
pub struct InFlight(Arc<Mutex<HashSet<String>>>);

/// Held for the duration of one mutation; releases its key on drop
#[derive(Debug)]
pub struct InFlightClaim {
    set: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    /// Claim a record; `None` when another request already holds it
    pub fn try_claim(&self, kind: EntityKind, id: &str) -> Option<InFlightClaim> {
        let key = format!("{}/{}", kind, id);
        let mut set = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(key.clone()) {
            return None;
        }
        Some(InFlightClaim {
            set: self.0.clone(),
            key,
        })
    }
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.key);
    }
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if state.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = state
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/denied", get(public::denied))
        // Role overviews
        .route("/admin", get(overview::admin))
        .route("/staff", get(overview::staff))
        .route("/trainer", get(overview::trainer));

    for kind in EntityKind::ALL {
        router = router.merge(pages::routes(kind));
    }

    let mut router = router
        .fallback(public::not_found)
        // Layers run bottom-up: the session is decoded before the guard reads it
        .layer(middleware::from_fn_with_state(state.clone(), route_guard_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    if state.request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if state.enable_cors {
        router = router.layer(cors_layer(&state));
    }

    router.with_state(state)
}
