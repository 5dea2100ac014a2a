//! Dashboard session: field-set store, text filter and fetched records,
//! persisted through a key-value store

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::db::{get_json, set_json, KeyValueStore, StorageError};
use crate::domain::{
    CustomFieldSet, DashboardRecord, DisplayMode, RecordItem, Repository, ViewConfig, ViewMode,
};
use crate::filter;
use crate::store::{FieldSetAction, FieldSetError, FieldSetState};

pub const FIELD_SETS_KEY: &str = "customFieldSets";
pub const ACTIVE_SET_KEY: &str = "activeSetId";
pub const TEXT_FILTER_KEY: &str = "dashboardTextFilter";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    FieldSet(#[from] FieldSetError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Field set name must not be empty")]
    EmptyName,
}

/// A record with the items shown for it in the current view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRecord {
    #[serde(flatten)]
    pub record: DashboardRecord,
    pub visible_items: Vec<RecordItem>,
}

/// Everything the dashboard grid needs to render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub records: Vec<RenderedRecord>,
    pub visible_fields: Vec<String>,
    pub view_mode: ViewMode,
    pub view_config: ViewConfig,
    pub active_set_id: Option<String>,
    pub text_filter: String,
    pub total: usize,
}

pub struct Dashboard {
    kv: Arc<dyn KeyValueStore>,
    state: FieldSetState,
    text_filter: String,
    records: Vec<DashboardRecord>,
}

impl Dashboard {
    /// Restore the persisted session. Corrupt field-set data is discarded
    /// with a warning; storage failures are returned.
    pub async fn load(kv: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let sets = match get_json::<Vec<CustomFieldSet>>(kv.as_ref(), FIELD_SETS_KEY).await {
            Ok(sets) => sets.unwrap_or_default(),
            Err(StorageError::Serialization { key, source }) => {
                tracing::warn!("Discarding unreadable {}: {}", key, source);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let active_set_id = kv.get(ACTIVE_SET_KEY).await?.filter(|id| !id.is_empty());
        let text_filter = kv.get(TEXT_FILTER_KEY).await?.unwrap_or_default();

        tracing::info!("Loaded {} field sets", sets.len());

        Ok(Self {
            kv,
            state: FieldSetState::new(sets, active_set_id),
            text_filter,
            records: Vec::new(),
        })
    }

    pub fn state(&self) -> &FieldSetState {
        &self.state
    }

    pub fn active_set(&self) -> Option<&CustomFieldSet> {
        self.state.active_set()
    }

    pub fn text_filter(&self) -> &str {
        &self.text_filter
    }

    pub fn records(&self) -> &[DashboardRecord] {
        &self.records
    }

    /// Card view unless the active set is displayed as rows
    pub fn view_mode(&self) -> ViewMode {
        self.active_set()
            .map(|set| ViewMode::from(set.display_mode))
            .unwrap_or_default()
    }

    /// Apply a store action and persist the result
    pub async fn dispatch(&mut self, action: FieldSetAction) -> Result<(), DashboardError> {
        self.transact(vec![action]).await
    }

    /// Apply `actions` together. When one is rejected or the result cannot
    /// be persisted, the in-memory state stays as it was.
    async fn transact(&mut self, actions: Vec<FieldSetAction>) -> Result<(), DashboardError> {
        let mut next = self.state.clone();
        for action in actions {
            next.dispatch(action)?;
        }

        let previous = std::mem::replace(&mut self.state, next);
        if let Err(e) = self.persist().await {
            tracing::warn!("Keeping previous field sets, persisting failed: {}", e);
            self.state = previous;
            return Err(e.into());
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), StorageError> {
        set_json(self.kv.as_ref(), FIELD_SETS_KEY, &self.state.sets).await?;
        match &self.state.active_set_id {
            Some(id) => self.kv.set(ACTIVE_SET_KEY, id).await,
            None => self.kv.delete(ACTIVE_SET_KEY).await,
        }
    }

    pub async fn set_text_filter(&mut self, value: impl Into<String>) -> Result<(), StorageError> {
        let value = value.into();
        self.kv.set(TEXT_FILTER_KEY, &value).await?;
        self.text_filter = value;
        Ok(())
    }

    /// Replace the fetched repositories and seed a default field set when
    /// none exists yet
    pub async fn set_repositories(&mut self, repositories: &[Repository]) -> Result<(), DashboardError> {
        self.records = filter::prepare_records(repositories);
        self.ensure_default(repositories).await
    }

    async fn ensure_default(&mut self, repositories: &[Repository]) -> Result<(), DashboardError> {
        if !self.state.is_empty() || repositories.is_empty() {
            return Ok(());
        }

        let set = filter::default_field_set(repositories);
        tracing::info!("Seeding default field set with {} fields", set.fields.len());
        self.dispatch(FieldSetAction::ReplaceAllFieldSets(vec![set])).await
    }

    /// Create a set copying the active set's fields and make it active
    pub async fn create_field_set(&mut self, name: &str) -> Result<CustomFieldSet, DashboardError> {
        self.create_field_set_at(name, Utc::now().timestamp_millis()).await
    }

    pub async fn create_field_set_at(
        &mut self,
        name: &str,
        now_millis: i64,
    ) -> Result<CustomFieldSet, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::EmptyName);
        }

        let id = self.state.next_set_id(now_millis);
        let set = CustomFieldSet::derive(id.clone(), name, self.active_set());

        self.transact(vec![
            FieldSetAction::AddFieldSet(set.clone()),
            FieldSetAction::SetActiveSet(id),
        ])
        .await?;
        Ok(set)
    }

    /// Switch between card and table view. Every set follows the new mode.
    pub async fn toggle_view_mode(&mut self) -> Result<ViewMode, DashboardError> {
        let next = self.view_mode().toggled();
        if self.state.is_empty() {
            return Ok(next);
        }

        let sets = self
            .state
            .sets
            .iter()
            .cloned()
            .map(|set| CustomFieldSet {
                display_mode: DisplayMode::from(next),
                ..set
            })
            .collect();
        self.dispatch(FieldSetAction::ReplaceAllFieldSets(sets)).await?;
        Ok(next)
    }

    /// Filter, sort and project the records for display
    pub fn render(&self) -> DashboardView {
        self.render_as(self.view_mode())
    }

    /// Render with an explicit view mode; the stored mode is left alone
    pub fn render_as(&self, view_mode: ViewMode) -> DashboardView {
        let active = self.active_set();
        let records = filter::apply(&self.records, active, &self.text_filter)
            .into_iter()
            .map(|record| RenderedRecord {
                visible_items: filter::visible_items(&record, active, view_mode),
                record,
            })
            .collect();

        DashboardView {
            total: self.records.len(),
            records,
            visible_fields: filter::visible_fields(active, view_mode),
            view_mode,
            view_config: active.map(|set| set.view_config).unwrap_or_default(),
            active_set_id: active.map(|set| set.id.clone()),
            text_filter: self.text_filter.clone(),
        }
    }
}
