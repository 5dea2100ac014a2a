//! Repository records as fetched from the backend and as shown on the dashboard

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar field value of a repository record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Convert a JSON value; null, arrays and objects are not scalars
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Scalar::Number),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Numeric reading of the value: numbers as-is, text only when it is a
    /// complete finite number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) if n.is_finite() => Some(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Lowercase a key and drop underscores: `Repo_Name` and `reponame` agree
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace('_', "")
}

/// Uppercase the first character of a key, keep the rest as-is
pub fn capitalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A repository entry of `/list-repos`: an open map of scalar fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Repository(pub Map<String, Value>);

impl Repository {
    pub fn name(&self) -> Option<&str> {
        self.0.get("repository_name").and_then(Value::as_str)
    }

    /// Scalar entries in source order
    pub fn scalars(&self) -> impl Iterator<Item = (&str, Scalar)> + '_ {
        self.0
            .iter()
            .filter_map(|(key, value)| Scalar::from_json(value).map(|s| (key.as_str(), s)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }
}

/// Response body of `/list-repos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryList {
    #[serde(default)]
    pub repositories: Vec<Repository>,
}

/// A labelled value shown on a dashboard card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordItem {
    pub id: String,
    pub label: String,
    pub value: String,
    pub is_header: bool,
}

/// A repository prepared for display: direct properties under several key
/// aliases plus a synthesized item list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<RecordItem>,
    pub properties: BTreeMap<String, Scalar>,
}

impl DashboardRecord {
    pub fn from_repository(repo: &Repository) -> Self {
        let name = repo.name().unwrap_or_default().to_string();

        let items = repo
            .scalars()
            .map(|(key, value)| RecordItem {
                id: key.to_lowercase().replace('_', "-"),
                label: capitalize_key(key),
                value: value.to_string(),
                is_header: false,
            })
            .collect();

        let mut properties = BTreeMap::new();
        for (key, value) in repo.scalars() {
            properties.insert(normalize_key(key), value);
        }
        // Original keys win over aliases
        for (key, value) in repo.scalars() {
            properties.insert(key.to_string(), value);
        }

        Self {
            id: name.clone(),
            title: name,
            description: String::new(),
            items,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Scalar> {
        self.properties.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo(value: Value) -> Repository {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Repo_Name"), "reponame");
        assert_eq!(normalize_key("reponame"), "reponame");
        assert_eq!(normalize_key("repository_name"), "repositoryname");
    }

    #[test]
    fn test_capitalize_key() {
        assert_eq!(capitalize_key("repository_name"), "Repository_name");
        assert_eq!(capitalize_key("Status"), "Status");
        assert_eq!(capitalize_key(""), "");
    }

    #[test]
    fn test_scalar_as_number() {
        assert_eq!(Scalar::from(5.0).as_number(), Some(5.0));
        assert_eq!(Scalar::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(Scalar::from("5abc").as_number(), None);
        assert_eq!(Scalar::from("inf").as_number(), None);
        assert_eq!(Scalar::from("").as_number(), None);
        assert_eq!(Scalar::from(true).as_number(), None);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(5.0).to_string(), "5");
        assert_eq!(Scalar::from(2.5).to_string(), "2.5");
        assert_eq!(Scalar::from(true).to_string(), "true");
    }

    #[test]
    fn test_record_from_repository() {
        let repo = repo(json!({
            "repository_name": "auth-service",
            "Team_Owner": "core",
            "stars": 12,
            "archived": null,
            "tags": ["a"]
        }));

        let record = DashboardRecord::from_repository(&repo);
        assert_eq!(record.id, "auth-service");
        assert_eq!(record.title, "auth-service");
        assert_eq!(record.description, "");

        let labels: Vec<_> = record.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Repository_name", "Team_Owner", "Stars"]);
        assert_eq!(record.items[1].id, "team-owner");
        assert_eq!(record.items[2].value, "12");

        assert_eq!(record.property("Team_Owner"), Some(&Scalar::from("core")));
        assert_eq!(record.property("teamowner"), Some(&Scalar::from("core")));
        assert_eq!(record.property("repositoryname"), Some(&Scalar::from("auth-service")));
        assert!(record.property("archived").is_none());
    }
}
