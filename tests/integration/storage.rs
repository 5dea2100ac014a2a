//! Settings persistence across restarts

use std::sync::Arc;

use fleetboard::db::{KeyValueStore, SqliteStore};
use fleetboard::domain::{Repository, ViewMode};
use fleetboard::session::Dashboard;

use super::common::fixture;

fn repositories() -> Vec<Repository> {
    serde_json::from_value(fixture("repositories.json")["repositories"].clone()).unwrap()
}

async fn open(path: &str) -> Dashboard {
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::open(path).await.unwrap());
    Dashboard::load(store).await.unwrap()
}

#[tokio::test]
async fn test_dashboard_settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");
    let path = path.to_str().unwrap();

    let created_id = {
        let mut dashboard = open(path).await;
        dashboard.set_repositories(&repositories()).await.unwrap();
        let set = dashboard.create_field_set("Ops").await.unwrap();
        dashboard.set_text_filter("payments").await.unwrap();
        dashboard.toggle_view_mode().await.unwrap();
        set.id
    };

    let dashboard = open(path).await;

    assert_eq!(dashboard.state().sets.len(), 2);
    assert_eq!(dashboard.state().active_set_id.as_deref(), Some(created_id.as_str()));
    assert_eq!(dashboard.text_filter(), "payments");
    // The created set starts in table view, so toggling switched to card
    assert_eq!(dashboard.view_mode(), ViewMode::Card);
}

#[tokio::test]
async fn test_corrupt_field_sets_are_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.db");
    let path = path.to_str().unwrap();

    {
        let store = SqliteStore::open(path).await.unwrap();
        store.set("customFieldSets", "{not json").await.unwrap();
        store.set("dashboardTextFilter", "auth").await.unwrap();
    }

    let mut dashboard = open(path).await;
    assert!(dashboard.state().is_empty());
    assert_eq!(dashboard.text_filter(), "auth");

    dashboard.set_repositories(&repositories()).await.unwrap();
    assert_eq!(dashboard.state().sets.len(), 1);
}
