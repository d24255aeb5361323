#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

use zoo_admin::access::RouteGuard;
use zoo_admin::auth::{generate_jwt, Claims};
use zoo_admin::config::RemoteConfig;
use zoo_admin::resource::ResourceRegistry;
use zoo_admin::server::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// One request the mock store received
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Store {
    collections: HashMap<String, Vec<Map<String, Value>>>,
    next_id: u64,
    calls: Vec<RemoteCall>,
    fail_next: Option<(StatusCode, Value)>,
}

impl Store {
    /// Log the call; returns the queued failure response, if any
    fn enter(&mut self, method: &str, path: String, body: Option<Value>) -> Option<Response> {
        self.calls.push(RemoteCall {
            method: method.to_string(),
            path,
            body,
        });
        self.fail_next
            .take()
            .map(|(status, body)| (status, Json(body)).into_response())
    }

    fn position(&self, collection: &str, id: &str) -> Option<usize> {
        self.collections
            .get(collection)?
            .iter()
            .position(|row| row.get("id").and_then(Value::as_str) == Some(id))
    }
}

type Shared = Arc<Mutex<Store>>;

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().unwrap()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!("Not found"))).into_response()
}

async fn list(State(store): State<Shared>, Path(collection): Path<String>) -> Response {
    let mut store = lock(&store);
    if let Some(failure) = store.enter("GET", format!("/{}", collection), None) {
        return failure;
    }
    let rows = store.collections.get(&collection).cloned().unwrap_or_default();
    Json(Value::Array(rows.into_iter().map(Value::Object).collect())).into_response()
}

async fn create(
    State(store): State<Shared>,
    Path(collection): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut store = lock(&store);
    if let Some(failure) = store.enter("POST", format!("/{}", collection), Some(Value::Object(body.clone()))) {
        return failure;
    }
    store.next_id += 1;
    let mut row = body;
    row.insert("id".into(), json!(store.next_id.to_string()));
    // Like the hosted store, new rows start active with a boolean flag
    row.entry("isDeleted").or_insert(json!(false));
    store.collections.entry(collection).or_default().push(row.clone());
    (StatusCode::CREATED, Json(Value::Object(row))).into_response()
}

async fn fetch(State(store): State<Shared>, Path((collection, id)): Path<(String, String)>) -> Response {
    let mut store = lock(&store);
    if let Some(failure) = store.enter("GET", format!("/{}/{}", collection, id), None) {
        return failure;
    }
    match store.position(&collection, &id) {
        Some(i) => Json(Value::Object(store.collections[&collection][i].clone())).into_response(),
        None => not_found(),
    }
}

async fn replace(
    State(store): State<Shared>,
    method: Method,
    Path((collection, id)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut store = lock(&store);
    let path = format!("/{}/{}", collection, id);
    if let Some(failure) = store.enter(method.as_str(), path, Some(Value::Object(body.clone()))) {
        return failure;
    }
    let Some(i) = store.position(&collection, &id) else {
        return not_found();
    };
    let Some(rows) = store.collections.get_mut(&collection) else {
        return not_found();
    };
    let row = &mut rows[i];
    for (key, value) in body {
        if key != "id" {
            row.insert(key, value);
        }
    }
    Json(Value::Object(row.clone())).into_response()
}

async fn remove(State(store): State<Shared>, Path((collection, id)): Path<(String, String)>) -> Response {
    let mut store = lock(&store);
    if let Some(failure) = store.enter("DELETE", format!("/{}/{}", collection, id), None) {
        return failure;
    }
    let Some(i) = store.position(&collection, &id) else {
        return not_found();
    };
    let Some(rows) = store.collections.get_mut(&collection) else {
        return not_found();
    };
    Json(Value::Object(rows.remove(i))).into_response()
}

/// In-process stand-in for the hosted REST store, one collection per path segment
#[derive(Clone)]
pub struct MockRemote {
    store: Shared,
    pub base_url: String,
}

impl MockRemote {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock remote")?;

        let store: Shared = Arc::default();
        let router = Router::new()
            .route("/:collection", get(list).post(create))
            .route("/:collection/:id", get(fetch).put(replace).patch(replace).delete(remove))
            .with_state(store.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            store,
            base_url: format!("http://127.0.0.1:{}", port),
        })
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig {
            staff_url: self.collection_url("staff"),
            trainer_url: self.collection_url("trainer"),
            cage_url: self.collection_url("cage"),
            area_url: self.collection_url("area"),
            news_url: self.collection_url("news"),
        }
    }

    /// Insert a row directly; returns its id. No call is logged.
    pub fn seed(&self, collection: &str, fields: Value) -> String {
        let mut store = lock(&self.store);
        store.next_id += 1;
        let id = store.next_id.to_string();
        let mut row = fields.as_object().cloned().unwrap_or_default();
        row.insert("id".into(), json!(id));
        store.collections.entry(collection.to_string()).or_default().push(row);
        id
    }

    pub fn rows(&self, collection: &str) -> Vec<Map<String, Value>> {
        lock(&self.store).collections.get(collection).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.store).calls.clone()
    }

    /// Calls other than reads
    pub fn writes(&self) -> Vec<RemoteCall> {
        self.calls().into_iter().filter(|c| c.method != "GET").collect()
    }

    pub fn fail_next(&self, status: StatusCode, body: Value) {
        lock(&self.store).fail_next = Some((status, body));
    }

    pub fn app_state(&self) -> AppState {
        let registry = ResourceRegistry::from_config(&self.remote_config()).expect("mock URLs are valid");
        AppState::new(RouteGuard::default(), registry, SECRET)
    }

    pub fn app(&self) -> Router {
        app(self.app_state())
    }
}

pub fn token(role: &str) -> String {
    let claims = Claims::new("tester", Some(role.to_string()), 1);
    generate_jwt(&claims, SECRET).expect("token")
}

/// Drive one request through the router; returns status and JSON body
pub async fn send(app: &Router, method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub async fn get_as(app: &Router, path: &str, role: Option<&str>) -> (StatusCode, Value) {
    let token = role.map(token);
    send(app, Method::GET, path, token.as_deref(), None).await
}
