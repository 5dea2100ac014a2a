//! HTTP API end to end against the stub backend

use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use fleetboard::db::{KeyValueStore, MemoryStore};

use super::common::{closed_url, field_id, spawn_app, spawn_backend, titles, StubBackend};

struct TestApp {
    url: String,
    http: reqwest::Client,
}

impl TestApp {
    async fn start() -> Self {
        Self::start_with_debounce(Duration::from_millis(300)).await
    }

    async fn start_with_debounce(debounce: Duration) -> Self {
        let backend = spawn_backend(StubBackend::default()).await;
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        Self {
            url: spawn_app(&backend, kv, debounce).await,
            http: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.http.get(format!("{}{}", self.url, path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .http
            .request(method, format!("{}{}", self.url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn dashboard(&self) -> Value {
        let (status, body) = self.get("/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    /// Patch a field of the active set, looked up by name
    async fn patch_field(&self, name: &str, update: Value) {
        let (_, sets) = self.get("/api/field-sets").await;
        let set_id = sets["data"]["activeSetId"].as_str().unwrap().to_string();
        let field = field_id(&sets, name);

        let (status, _) = self
            .send(
                reqwest::Method::PATCH,
                &format!("/api/field-sets/{}/fields/{}", set_id, field),
                update,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::start().await;
    let response = reqwest::get(format!("{}/health", app.url)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_dashboard_seeds_default_field_set() {
    let app = TestApp::start().await;

    let body = app.dashboard().await;

    assert_eq!(
        titles(&body),
        vec!["auth-service", "payment-service", "billing-worker", "search-indexer"]
    );
    assert_eq!(
        body["data"]["visibleFields"],
        json!(["Squad", "Status", "Priority", "Domain", "Archived"])
    );
    assert_eq!(body["data"]["viewMode"], "card");
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["activeSetId"], "1");

    let (_, sets) = app.get("/api/field-sets").await;
    assert_eq!(sets["data"]["customFieldSets"][0]["name"], "Default Fields");
}

#[tokio::test]
async fn test_query_parameter_filters_and_persists() {
    let app = TestApp::start().await;

    let (status, body) = app.get("/api/dashboard?q=auth").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["auth-service"]);

    let body = app.dashboard().await;
    assert_eq!(body["data"]["textFilter"], "auth");
    assert_eq!(titles(&body), vec!["auth-service"]);
}

#[tokio::test]
async fn test_view_parameter_is_not_persisted() {
    let app = TestApp::start().await;

    let (status, body) = app.get("/api/dashboard?view=table").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["viewMode"], "table");

    assert_eq!(app.dashboard().await["data"]["viewMode"], "card");
}

#[tokio::test]
async fn test_invalid_view_is_bad_request() {
    let app = TestApp::start().await;

    let (status, body) = app.get("/api/dashboard?view=grid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_numeric_field_filter() {
    let app = TestApp::start().await;
    app.dashboard().await;

    app.patch_field(
        "Status",
        json!({"filter": ">3&&<10||=100", "filterEnabled": true}),
    )
    .await;

    assert_eq!(
        titles(&app.dashboard().await),
        vec!["auth-service", "payment-service"]
    );
}

#[tokio::test]
async fn test_wildcard_field_filter() {
    let app = TestApp::start().await;
    app.dashboard().await;

    app.patch_field("Domain", json!({"filter": "%.com", "filterEnabled": true}))
        .await;

    assert_eq!(
        titles(&app.dashboard().await),
        vec!["auth-service", "billing-worker"]
    );
}

#[tokio::test]
async fn test_disabled_filter_is_ignored() {
    let app = TestApp::start().await;
    app.dashboard().await;

    app.patch_field("Domain", json!({"filter": "%.com", "filterEnabled": false}))
        .await;

    assert_eq!(titles(&app.dashboard().await).len(), 4);
}

#[tokio::test]
async fn test_sort_descending() {
    let app = TestApp::start().await;
    app.dashboard().await;

    app.patch_field("Priority", json!({"sortOrder": "desc"})).await;

    assert_eq!(
        titles(&app.dashboard().await),
        vec!["billing-worker", "payment-service", "search-indexer", "auth-service"]
    );
}

#[tokio::test]
async fn test_hidden_field_leaves_visible_fields() {
    let app = TestApp::start().await;
    app.dashboard().await;

    app.patch_field("Squad", json!({"isVisibleInCard": false})).await;

    let body = app.dashboard().await;
    assert_eq!(
        body["data"]["visibleFields"],
        json!(["Status", "Priority", "Domain", "Archived"])
    );
    let labels: Vec<_> = body["data"]["records"][0]["visibleItems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["label"].clone())
        .collect();
    assert!(!labels.contains(&json!("Squad")));
}

#[tokio::test]
async fn test_create_and_delete_field_set() {
    let app = TestApp::start().await;
    app.dashboard().await;

    let (status, created) = app
        .send(reqwest::Method::POST, "/api/field-sets", json!({"name": "  Ops  "}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["name"], "Ops");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (_, sets) = app.get("/api/field-sets").await;
    assert_eq!(sets["data"]["activeSetId"], id.as_str());
    assert_eq!(sets["data"]["customFieldSets"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .send(reqwest::Method::DELETE, &format!("/api/field-sets/{}", id), Value::Null)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, sets) = app.get("/api/field-sets").await;
    assert_eq!(sets["data"]["activeSetId"], "1");

    let (status, body) = app
        .send(reqwest::Method::DELETE, "/api/field-sets/1", Value::Null)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_blank_field_set_name_is_rejected() {
    let app = TestApp::start().await;
    app.dashboard().await;

    let (status, _) = app
        .send(reqwest::Method::POST, "/api/field-sets", json!({"name": "   "}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_active_set_is_not_found() {
    let app = TestApp::start().await;
    app.dashboard().await;

    let (status, body) = app
        .send(reqwest::Method::PUT, "/api/field-sets/active", json!({"id": "missing"}))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_move_field() {
    let app = TestApp::start().await;
    app.dashboard().await;

    let (_, sets) = app.get("/api/field-sets").await;
    let status_id = field_id(&sets, "Status");

    let (status, moved) = app
        .send(
            reqwest::Method::POST,
            &format!("/api/field-sets/1/fields/{}/move", status_id),
            json!({"direction": "up"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["data"]["fields"][1]["name"], "Status");
    assert_eq!(moved["data"]["fields"][2]["name"], "Squad");
}

#[tokio::test]
async fn test_toggle_view_mode() {
    let app = TestApp::start().await;
    app.dashboard().await;

    let (status, body) = app
        .send(reqwest::Method::POST, "/api/field-sets/view-mode", Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["viewMode"], "table");

    assert_eq!(app.dashboard().await["data"]["viewMode"], "table");
}

#[tokio::test]
async fn test_text_filter_is_debounced() {
    let app = TestApp::start_with_debounce(Duration::from_millis(50)).await;
    app.dashboard().await;

    for value in ["a", "ind", "indexer"] {
        let (status, body) = app
            .send(reqwest::Method::PUT, "/api/text-filter", json!({"value": value}))
            .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["data"]["debounceMs"], 50);
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    let body = app.dashboard().await;
    assert_eq!(body["data"]["textFilter"], "indexer");
    assert_eq!(titles(&body), vec!["search-indexer"]);
}

#[tokio::test]
async fn test_service_detail() {
    let app = TestApp::start().await;

    let (status, body) = app.get("/api/services/auth-service").await;
    assert_eq!(status, StatusCode::OK);

    let overview = &body["data"]["overview"];
    assert_eq!(overview["name"], "auth-service");
    assert_eq!(overview["stableTag"], "v1.4.0");
    assert_eq!(overview["namespace"], "identity");

    let apps = body["data"]["apps"].as_array().unwrap();
    let names: Vec<_> = apps.iter().map(|a| a["appName"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "dev-auth-service",
            "integration-auth-service",
            "auth-service-prod",
            "auth-service-worker"
        ]
    );

    assert_eq!(apps[0]["status"], "Up to date");
    assert_eq!(apps[1]["status"], "Version Mismatch");
    assert_eq!(apps[3]["status"], "No Deployment");
    assert_eq!(apps[3]["displayName"], "worker");

    let prod = &apps[2];
    assert_eq!(prod["status"], "In Progress");
    assert_eq!(prod["displayName"], "prod");
    assert_eq!(prod["canaryVersion"], "v1.5.0-rc1");
    assert_eq!(prod["progress"]["stablePercent"].as_f64(), Some(75.0));
    assert_eq!(prod["progress"]["canaryPercent"].as_f64(), Some(25.0));
    assert_eq!(prod["rollout"]["phase"], "paused");
    assert_eq!(prod["rollout"]["duration"], "10m");
    assert_eq!(prod["grafanaUrl"], "https://grafana.example.com/d/auth-prod");
}

#[tokio::test]
async fn test_service_sort_and_search() {
    let app = TestApp::start().await;

    let (_, body) = app
        .get("/api/services/auth-service?sort=type&direction=desc")
        .await;
    let names: Vec<_> = body["data"]["apps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["appName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "dev-auth-service",
            "integration-auth-service",
            "auth-service-worker",
            "auth-service-prod"
        ]
    );

    let (_, body) = app.get("/api/services/auth-service?search=PROD").await;
    assert_eq!(body["data"]["apps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_service_errors() {
    let app = TestApp::start().await;

    let (status, _) = app.get("/api/services/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/services/broken").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    let (status, _) = app.get("/api/services/auth-service?sort=color").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreachable_backend_is_bad_gateway() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let url = spawn_app(&closed_url().await, kv, Duration::from_millis(300)).await;

    let response = reqwest::get(format!("{}/api/dashboard", url)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
