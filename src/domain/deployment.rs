//! Deployment payloads of the per-repository backend endpoint

use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant of a traffic-split deployment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeploymentKind {
    Stable,
    Canary,
    Other(String),
}

impl DeploymentKind {
    pub fn as_str(&self) -> &str {
        match self {
            DeploymentKind::Stable => "stable",
            DeploymentKind::Canary => "canary",
            DeploymentKind::Other(s) => s,
        }
    }
}

impl fmt::Display for DeploymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for DeploymentKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "stable" => DeploymentKind::Stable,
            "canary" => DeploymentKind::Canary,
            _ => DeploymentKind::Other(s),
        }
    }
}

impl From<DeploymentKind> for String {
    fn from(kind: DeploymentKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One running variant of an application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(rename = "type")]
    pub kind: DeploymentKind,
    pub percentage: f64,
    #[serde(default)]
    pub version: String,
}

impl Deployment {
    pub fn new(kind: DeploymentKind, percentage: f64, version: impl Into<String>) -> Self {
        Self {
            kind,
            percentage,
            version: version.into(),
        }
    }

    pub fn stable(percentage: f64, version: impl Into<String>) -> Self {
        Self::new(DeploymentKind::Stable, percentage, version)
    }

    pub fn canary(percentage: f64, version: impl Into<String>) -> Self {
        Self::new(DeploymentKind::Canary, percentage, version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSet {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// ArgoCD sync weight; reported either as a JSON string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyncWeight {
    Number(f64),
    Text(String),
}

impl SyncWeight {
    /// Numeric weight, `None` when the reported value is not a number
    pub fn value(&self) -> Option<f64> {
        match self {
            SyncWeight::Number(n) => Some(*n).filter(|n| n.is_finite()),
            SyncWeight::Text(s) => crate::filter::parse_float_prefix(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgocdStatus {
    pub weight: Option<SyncWeight>,
    #[serde(default)]
    pub step: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgocdApp {
    pub status: Option<ArgocdStatus>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrafanaLink {
    #[serde(default)]
    pub url: String,
}

/// An application of a repository together with its rollout state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentApp {
    pub app_name: String,
    #[serde(rename = "type", default)]
    pub app_type: String,
    pub deployment: Option<DeploymentSet>,
    pub argocd: Option<ArgocdApp>,
    pub grafana: Option<GrafanaLink>,
}

impl DeploymentApp {
    pub fn deployments(&self) -> &[Deployment] {
        self.deployment
            .as_ref()
            .map(|d| d.deployments.as_slice())
            .unwrap_or_default()
    }

    pub fn find(&self, kind: &DeploymentKind) -> Option<&Deployment> {
        self.deployments().iter().find(|d| &d.kind == kind)
    }

    /// Weight reported by ArgoCD. Zero without a status block, `None` when
    /// the status carries something that is not a number.
    pub fn sync_weight(&self) -> Option<f64> {
        match self.argocd.as_ref().and_then(|a| a.status.as_ref()) {
            Some(status) => status.weight.as_ref().and_then(SyncWeight::value),
            None => Some(0.0),
        }
    }

    /// First rollout step as raw JSON text, `{}` when absent
    pub fn first_step(&self) -> &str {
        self.argocd
            .as_ref()
            .and_then(|a| a.status.as_ref())
            .and_then(|s| s.step.first())
            .map(String::as_str)
            .unwrap_or("{}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryTag {
    pub tag: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgocdLink {
    pub url: Option<String>,
}

/// Response body of `/?repo=<id>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetail {
    pub repo_desc: Option<String>,
    pub repo_squad: Option<String>,
    pub repo_bit_url: Option<String>,
    pub repo_codefresh: Option<String>,
    pub repo_namespace: Option<String>,
    pub argocd: Option<ArgocdLink>,
    #[serde(default)]
    pub apps: Vec<DeploymentApp>,
    #[serde(default)]
    pub tags: Vec<RepositoryTag>,
}

impl RepositoryDetail {
    /// Tag currently marked as stable, if any
    pub fn stable_tag(&self) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.status == "stable")
            .map(|t| t.tag.as_str())
            .filter(|t| !t.is_empty())
    }
}
