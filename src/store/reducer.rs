//! Field-set store: a reducer over a closed set of actions

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::CustomFieldSet;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldSetError {
    #[error("Cannot delete the last remaining field set")]
    LastFieldSet,

    #[error("Field set not found: {0}")]
    UnknownFieldSet(String),

    #[error("Field set already exists: {0}")]
    DuplicateFieldSet(String),

    #[error("At least one field set is required")]
    EmptyFieldSets,
}

/// Store transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldSetAction {
    SetActiveSet(String),
    UpdateFieldSet(CustomFieldSet),
    AddFieldSet(CustomFieldSet),
    DeleteFieldSet(String),
    ReplaceAllFieldSets(Vec<CustomFieldSet>),
}

impl FieldSetAction {
    pub fn name(&self) -> &'static str {
        match self {
            FieldSetAction::SetActiveSet(_) => "SET_ACTIVE_SET",
            FieldSetAction::UpdateFieldSet(_) => "UPDATE_FIELD_SET",
            FieldSetAction::AddFieldSet(_) => "ADD_FIELD_SET",
            FieldSetAction::DeleteFieldSet(_) => "DELETE_FIELD_SET",
            FieldSetAction::ReplaceAllFieldSets(_) => "REPLACE_ALL_FIELD_SETS",
        }
    }
}

/// All field sets plus the id of the active one.
///
/// Sets are kept in insertion order. An empty store is "uninitialized";
/// once it holds a set, transitions never empty it again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSetState {
    #[serde(rename = "customFieldSets")]
    pub sets: Vec<CustomFieldSet>,
    pub active_set_id: Option<String>,
}

impl FieldSetState {
    pub fn new(sets: Vec<CustomFieldSet>, active_set_id: Option<String>) -> Self {
        Self {
            sets,
            active_set_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CustomFieldSet> {
        self.sets.iter().find(|set| set.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The active set, or the first set when the active id is stale or unset
    pub fn active_set(&self) -> Option<&CustomFieldSet> {
        self.active_set_id
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.sets.first())
    }

    /// Apply one action. On error the state is left untouched.
    pub fn dispatch(&mut self, action: FieldSetAction) -> Result<(), FieldSetError> {
        tracing::debug!("Dispatching field set action {}", action.name());

        match action {
            FieldSetAction::SetActiveSet(id) => {
                if !self.contains(&id) {
                    return Err(FieldSetError::UnknownFieldSet(id));
                }
                self.active_set_id = Some(id);
            }
            FieldSetAction::UpdateFieldSet(set) => {
                let slot = self
                    .sets
                    .iter_mut()
                    .find(|existing| existing.id == set.id)
                    .ok_or_else(|| FieldSetError::UnknownFieldSet(set.id.clone()))?;
                *slot = set;
            }
            FieldSetAction::AddFieldSet(set) => {
                if self.contains(&set.id) {
                    return Err(FieldSetError::DuplicateFieldSet(set.id));
                }
                self.sets.push(set);
            }
            FieldSetAction::DeleteFieldSet(id) => {
                let index = self
                    .sets
                    .iter()
                    .position(|set| set.id == id)
                    .ok_or_else(|| FieldSetError::UnknownFieldSet(id.clone()))?;
                if self.sets.len() == 1 {
                    return Err(FieldSetError::LastFieldSet);
                }
                self.sets.remove(index);
                if self.active_set_id.as_deref() == Some(id.as_str()) {
                    self.active_set_id = self.sets.first().map(|set| set.id.clone());
                }
            }
            FieldSetAction::ReplaceAllFieldSets(sets) => {
                if sets.is_empty() {
                    return Err(FieldSetError::EmptyFieldSets);
                }
                for (index, set) in sets.iter().enumerate() {
                    if sets[..index].iter().any(|other| other.id == set.id) {
                        return Err(FieldSetError::DuplicateFieldSet(set.id.clone()));
                    }
                }
                self.sets = sets;
                let active_is_valid = self
                    .active_set_id
                    .as_deref()
                    .is_some_and(|id| self.contains(id));
                if !active_is_valid {
                    self.active_set_id = self.sets.first().map(|set| set.id.clone());
                }
            }
        }

        Ok(())
    }

    /// A fresh set id: the given millisecond timestamp, bumped past any
    /// id already in use
    pub fn next_set_id(&self, now_millis: i64) -> String {
        let mut candidate = now_millis;
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
