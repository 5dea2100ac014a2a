//! Backend client against the stub repository service

use std::time::Duration;

use fleetboard::integrations::{FetchError, FetchTask};

use super::common::{client_for, closed_url, spawn_backend, StubBackend};

#[tokio::test]
async fn test_list_repositories() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let repos = client.list_repositories().await.unwrap();

    let names: Vec<_> = repos.iter().filter_map(|r| r.name()).collect();
    assert_eq!(
        names,
        vec!["auth-service", "payment-service", "billing-worker", "search-indexer"]
    );
}

#[tokio::test]
async fn test_get_repository_detail() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let detail = client.get_repository("auth-service").await.unwrap();

    assert_eq!(detail.stable_tag(), Some("v1.4.0"));
    assert_eq!(detail.apps.len(), 4);
}

#[tokio::test]
async fn test_unknown_repository_is_not_found() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let err = client.get_repository("nope").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let err = client.get_repository("broken").await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failures() {
    let stub = StubBackend::failing(2);
    let url = spawn_backend(stub.clone()).await;
    let client = client_for(&url);

    let repos = client.list_repositories_with_retry().await.unwrap();

    assert_eq!(repos.len(), 4);
    assert_eq!(stub.calls(), 3);
}

#[tokio::test]
async fn test_retry_gives_up_after_all_attempts() {
    let stub = StubBackend::failing(10);
    let url = spawn_backend(stub.clone()).await;
    let client = client_for(&url);

    let err = client.list_repositories_with_retry().await.unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 503, .. }));
    // First call plus three retries
    assert_eq!(stub.calls(), 4);
}

#[tokio::test]
async fn test_health() {
    let url = spawn_backend(StubBackend::default()).await;

    assert!(client_for(&url).health().await.is_ok());
}

#[tokio::test]
async fn test_unreachable_backend_is_request_error() {
    let client = client_for(&closed_url().await);

    let err = client.list_repositories().await.unwrap_err();

    assert!(matches!(err, FetchError::Request(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_fetch_task_publishes_repositories() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let mut task = FetchTask::spawn(async move { client.list_repositories().await });
    let state = task.settled().await;

    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.data.map(|repos| repos.len()), Some(4));
}

#[tokio::test]
async fn test_fetch_task_publishes_error() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let mut task = FetchTask::spawn(async move { client.get_repository("nope").await });
    let state = task.settled().await;

    assert!(state.data.is_none());
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_aborted_fetch_stays_loading() {
    let url = spawn_backend(StubBackend::default()).await;
    let client = client_for(&url);

    let task = FetchTask::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        client.list_repositories().await
    });
    task.abort();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(task.is_aborted());
    let state = task.state();
    assert!(state.loading);
    assert!(state.data.is_none());
}
