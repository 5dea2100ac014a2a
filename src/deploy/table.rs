//! Per-service deployment table: ordering, search and row views

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::status::{classify, parse_step, progress_split, rollout_phase};
use super::status::{DeploymentStatus, ProgressSplit, RolloutPhase, StatusColor};
use crate::domain::{DeploymentApp, DeploymentKind, RepositoryDetail};
use crate::filter::locale_compare;

/// Column the deployment table is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppSortColumn {
    #[default]
    #[serde(rename = "appName")]
    AppName,
    #[serde(rename = "type")]
    Type,
}

impl FromStr for AppSortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appName" | "app_name" | "name" => Ok(AppSortColumn::AppName),
            "type" => Ok(AppSortColumn::Type),
            _ => Err(format!("Unknown sort column: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction: {}", s)),
        }
    }
}

/// Environment priority of an app name: `dev-` first, then `integration-`
pub fn app_priority(app_name: &str) -> i8 {
    let lower = app_name.to_lowercase();
    if lower.starts_with("dev-") {
        -2
    } else if lower.starts_with("integration-") {
        -1
    } else {
        0
    }
}

/// Sort apps by environment priority, then by the chosen column.
///
/// The direction applies to the column only; priority always comes first.
pub fn sort_apps(apps: &mut [DeploymentApp], column: AppSortColumn, direction: SortDirection) {
    apps.sort_by(|a, b| {
        let priority = app_priority(&a.app_name).cmp(&app_priority(&b.app_name));
        if priority != Ordering::Equal {
            return priority;
        }

        let ordering = match column {
            AppSortColumn::AppName => locale_compare(&a.app_name, &b.app_name),
            AppSortColumn::Type => locale_compare(&a.app_type, &b.app_type),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Keep apps whose name contains `search` (case-insensitive)
pub fn search_apps(apps: &[DeploymentApp], search: &str) -> Vec<DeploymentApp> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return apps.to_vec();
    }

    apps.iter()
        .filter(|app| app.app_name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// App name without the `<repo>-` prefix
pub fn display_name<'a>(app_name: &'a str, repo_name: &str) -> &'a str {
    app_name
        .strip_prefix(repo_name)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(app_name)
}

/// One row of the deployment table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDeploymentView {
    pub app_name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub stable_version: Option<String>,
    pub canary_version: Option<String>,
    pub status: DeploymentStatus,
    pub color: StatusColor,
    pub progress: Option<ProgressSplit>,
    pub rollout: Option<RolloutPhase>,
    pub argocd_url: Option<String>,
    pub grafana_url: Option<String>,
}

impl AppDeploymentView {
    pub fn build(app: &DeploymentApp, repo_name: &str, stable_tag: Option<&str>) -> Self {
        let deployments = app.deployments();
        let summary = classify(deployments, stable_tag);
        let step = parse_step(app.first_step());

        let version_of = |kind: DeploymentKind| app.find(&kind).map(|d| d.version.clone());
        let non_empty = |url: &str| Some(url.to_string()).filter(|u| !u.is_empty());

        Self {
            app_name: app.app_name.clone(),
            display_name: display_name(&app.app_name, repo_name).to_string(),
            app_type: app.app_type.clone(),
            stable_version: version_of(DeploymentKind::Stable),
            canary_version: version_of(DeploymentKind::Canary),
            status: summary.status,
            color: summary.color,
            progress: progress_split(deployments, app.sync_weight()),
            rollout: rollout_phase(summary.status, &step),
            argocd_url: app.argocd.as_ref().and_then(|a| non_empty(&a.url)),
            grafana_url: app.grafana.as_ref().and_then(|g| non_empty(&g.url)),
        }
    }
}

/// Header block of the service detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOverview {
    pub name: String,
    pub description: Option<String>,
    pub squad: Option<String>,
    pub stable_tag: Option<String>,
    pub github_url: Option<String>,
    pub codefresh_url: Option<String>,
    pub argocd_url: Option<String>,
    pub namespace: Option<String>,
}

impl ServiceOverview {
    pub fn build(repo_name: &str, detail: &RepositoryDetail) -> Self {
        Self {
            name: repo_name.to_string(),
            description: detail.repo_desc.clone(),
            squad: detail.repo_squad.clone(),
            stable_tag: detail.stable_tag().map(str::to_string),
            github_url: detail.repo_bit_url.clone(),
            codefresh_url: detail.repo_codefresh.clone(),
            argocd_url: detail.argocd.as_ref().and_then(|a| a.url.clone()),
            namespace: detail.repo_namespace.clone(),
        }
    }
}

/// Full service detail: overview plus the searched and sorted app rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceView {
    pub overview: ServiceOverview,
    pub apps: Vec<AppDeploymentView>,
}

impl ServiceView {
    pub fn build(
        repo_name: &str,
        detail: &RepositoryDetail,
        search: &str,
        column: AppSortColumn,
        direction: SortDirection,
    ) -> Self {
        let overview = ServiceOverview::build(repo_name, detail);
        let stable_tag = overview.stable_tag.as_deref();

        let mut apps = search_apps(&detail.apps, search);
        sort_apps(&mut apps, column, direction);

        let apps = apps
            .iter()
            .map(|app| AppDeploymentView::build(app, repo_name, stable_tag))
            .collect();

        Self { overview, apps }
    }
}
