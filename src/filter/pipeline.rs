//! Dashboard pipeline: free-text filter, field filters, multi-key sort
//!
//! Card and table views both render the output of [`apply`]; they differ only
//! in which fields are shown ([`visible_fields`]), never in which records.

use std::cmp::Ordering;

use crate::domain::{
    capitalize_key, CustomField, CustomFieldSet, DashboardRecord, Repository, Scalar, ViewMode,
};

use super::compare::{compare_values, directed};
use super::conditions::value_matches_filter;
use super::resolver::resolve_value;

/// Field names never shown as columns; they are rendered as title/description
const RESERVED_FIELDS: [&str; 2] = ["repository_name", "description"];

/// Build display records from fetched repositories
pub fn prepare_records(repositories: &[Repository]) -> Vec<DashboardRecord> {
    repositories
        .iter()
        .map(DashboardRecord::from_repository)
        .collect()
}

/// Filter and sort records for display.
///
/// Stages run in order on the survivors of the previous stage: free-text
/// query, enabled field filters (all must hold), then a stable sort over the
/// fields with a sort order, in field-set order.
pub fn apply(
    records: &[DashboardRecord],
    active_set: Option<&CustomFieldSet>,
    free_text_query: &str,
) -> Vec<DashboardRecord> {
    let Some(set) = active_set else {
        return records.to_vec();
    };

    let query = normalize_query(free_text_query);
    let filters: Vec<&CustomField> = set.fields.iter().filter(|f| f.has_active_filter()).collect();
    let sorts: Vec<&CustomField> = set.fields.iter().filter(|f| f.sort_order.is_active()).collect();

    let mut output: Vec<DashboardRecord> = records
        .iter()
        .filter(|record| query.as_deref().map_or(true, |q| matches_text(record, q)))
        .filter(|record| matches_field_filters(record, &filters))
        .cloned()
        .collect();

    tracing::debug!(
        input = records.len(),
        output = output.len(),
        filters = filters.len(),
        sorts = sorts.len(),
        "Applied dashboard filters"
    );

    if !sorts.is_empty() {
        output.sort_by(|a, b| compare_records(a, b, &sorts));
    }

    output
}

/// Trimmed, lowercased query with `%` removed; `None` when nothing is left
fn normalize_query(query: &str) -> Option<String> {
    let query = query.trim().replace('%', "").to_lowercase();
    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}

fn matches_text(record: &DashboardRecord, query: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(query);

    contains(&record.title)
        || contains(&record.description)
        || record.items.iter().any(|item| contains(&item.value))
        || record.properties.values().any(|value| contains(&value.to_string()))
}

fn matches_field_filters(record: &DashboardRecord, filters: &[&CustomField]) -> bool {
    filters.iter().all(|field| {
        let value = resolve_value(record, &field.name);
        value_matches_filter(value.as_ref(), &field.filter)
    })
}

fn sort_value(record: &DashboardRecord, field_name: &str) -> Scalar {
    resolve_value(record, field_name).unwrap_or_else(|| Scalar::Text(String::new()))
}

fn compare_records(a: &DashboardRecord, b: &DashboardRecord, sorts: &[&CustomField]) -> Ordering {
    for field in sorts {
        let ordering = compare_values(&sort_value(a, &field.name), &sort_value(b, &field.name));
        if ordering != Ordering::Equal {
            return directed(ordering, field.sort_order);
        }
    }
    Ordering::Equal
}

/// Names of the fields shown as columns in the given view mode
pub fn visible_fields(set: Option<&CustomFieldSet>, mode: ViewMode) -> Vec<String> {
    let Some(set) = set else {
        return Vec::new();
    };

    set.fields
        .iter()
        .filter(|field| {
            let lower = field.name.to_lowercase();
            !RESERVED_FIELDS.contains(&lower.as_str()) && field.is_visible_in(mode)
        })
        .map(|field| field.name.clone())
        .collect()
}

/// The record's items whose label names a field visible in the given mode
pub fn visible_items(
    record: &DashboardRecord,
    set: Option<&CustomFieldSet>,
    mode: ViewMode,
) -> Vec<crate::domain::RecordItem> {
    let Some(set) = set else {
        return Vec::new();
    };

    record
        .items
        .iter()
        .filter(|item| {
            set.fields
                .iter()
                .find(|f| f.name == item.label)
                .is_some_and(|f| f.is_visible_in(mode))
        })
        .cloned()
        .collect()
}

/// Field set seeded from the keys of the fetched repositories, in
/// first-seen order
pub fn default_field_set(repositories: &[Repository]) -> CustomFieldSet {
    let mut names: Vec<String> = Vec::new();
    for key in repositories.iter().flat_map(Repository::keys) {
        let name = capitalize_key(key);
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let fields = names
        .into_iter()
        .enumerate()
        .map(|(index, name)| CustomField::new((index + 1).to_string(), name))
        .collect();

    CustomFieldSet::new("1", "Default Fields", fields)
}
