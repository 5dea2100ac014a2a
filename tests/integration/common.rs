//! Shared helpers: fixtures, the stub backend and the app under test

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fleetboard::api::{build_router, AppState};
use fleetboard::db::KeyValueStore;
use fleetboard::integrations::BackendClient;
use fleetboard::session::Dashboard;

/// Get the path to the test fixtures
pub fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture(name: &str) -> Value {
    let raw = std::fs::read_to_string(fixtures_path().join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

/// Knobs and counters of the stub backend
#[derive(Clone, Default)]
pub struct StubBackend {
    /// `/list-repos` answers 503 while this is above zero
    pub list_failures: Arc<AtomicU32>,
    pub list_calls: Arc<AtomicU32>,
}

impl StubBackend {
    pub fn failing(times: u32) -> Self {
        let stub = Self::default();
        stub.list_failures.store(times, Ordering::SeqCst);
        stub
    }

    pub fn calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

async fn list_repos(State(stub): State<StubBackend>) -> Response {
    stub.list_calls.fetch_add(1, Ordering::SeqCst);

    let remaining = stub.list_failures.load(Ordering::SeqCst);
    if remaining > 0 {
        stub.list_failures.store(remaining - 1, Ordering::SeqCst);
        return (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response();
    }

    Json(fixture("repositories.json")).into_response()
}

async fn repo_detail(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("repo").map(String::as_str) {
        Some("auth-service") => Json(fixture("auth-service.json")).into_response(),
        Some("broken") => (StatusCode::OK, "<html>oops</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown repository").into_response(),
    }
}

async fn health() -> &'static str {
    "OK"
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub async fn spawn_backend(stub: StubBackend) -> String {
    let app = Router::new()
        .route("/list-repos", get(list_repos))
        .route("/", get(repo_detail))
        .route("/health", get(health))
        .with_state(stub);
    serve(app).await
}

/// A URL nothing listens on
pub async fn closed_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn client_for(base_url: &str) -> BackendClient {
    BackendClient::new(base_url).with_retry(3, Duration::from_millis(10))
}

/// Start the API against `backend_url`, persisting into `kv`
pub async fn spawn_app(backend_url: &str, kv: Arc<dyn KeyValueStore>, debounce: Duration) -> String {
    let dashboard = Dashboard::load(kv).await.unwrap();
    let state = AppState::new(dashboard, client_for(backend_url), debounce);
    serve(build_router(state, true)).await
}

pub fn titles(dashboard: &Value) -> Vec<String> {
    dashboard["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

/// Id of the field named `name` in the active set
pub fn field_id(field_sets: &Value, name: &str) -> String {
    let active = field_sets["data"]["activeSetId"].as_str().unwrap();
    let set = field_sets["data"]["customFieldSets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] == active)
        .unwrap();
    set["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == name)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}
