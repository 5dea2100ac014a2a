//! Resolve a logical field name to a value on a heterogeneous record

use crate::domain::{normalize_key, DashboardRecord, Scalar};

/// Look up `field_name` on a record.
///
/// Tried in order: the exact key, the lowercased key, the lowercased key
/// without underscores, the original-case key without underscores, the
/// repository name (for `repository_name`-like fields), and finally the
/// synthesized items by normalized label. Filter and sort both go through
/// this function so a field behaves the same in either.
pub fn resolve_value(record: &DashboardRecord, field_name: &str) -> Option<Scalar> {
    let normalized = normalize_key(field_name);

    let direct = [
        field_name.to_string(),
        field_name.to_lowercase(),
        normalized.clone(),
        field_name.replace('_', ""),
    ];
    if let Some(value) = direct.iter().find_map(|key| record.property(key)) {
        return Some(value.clone());
    }

    if normalized == "repositoryname" {
        if let Some(value) = record.property("repository_name") {
            return Some(value.clone());
        }
        if !record.title.is_empty() {
            return Some(Scalar::Text(record.title.clone()));
        }
    }

    record
        .items
        .iter()
        .find(|item| normalize_key(&item.label) == normalized)
        .map(|item| Scalar::Text(item.value.clone()))
}
