//! Rollout status of a single application

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Deployment, DeploymentKind};

/// Classification of an application's rollout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentStatus {
    #[serde(rename = "No Deployment")]
    NoDeployment,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Up to date")]
    UpToDate,
    #[serde(rename = "Version Mismatch")]
    VersionMismatch,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl DeploymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentStatus::NoDeployment => "No Deployment",
            DeploymentStatus::InProgress => "In Progress",
            DeploymentStatus::UpToDate => "Up to date",
            DeploymentStatus::VersionMismatch => "Version Mismatch",
            DeploymentStatus::Unknown => "Unknown",
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            DeploymentStatus::NoDeployment => StatusColor::Yellow,
            DeploymentStatus::InProgress => StatusColor::Blue,
            DeploymentStatus::UpToDate => StatusColor::Green,
            DeploymentStatus::VersionMismatch => StatusColor::Red,
            DeploymentStatus::Unknown => StatusColor::Gray,
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    Yellow,
    Blue,
    Green,
    Red,
    Gray,
}

/// Status label with its display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub status: DeploymentStatus,
    pub color: StatusColor,
}

impl From<DeploymentStatus> for StatusSummary {
    fn from(status: DeploymentStatus) -> Self {
        Self {
            status,
            color: status.color(),
        }
    }
}

/// Classify the rollout of one application.
///
/// A single deployment at 100% is up to date unless a stable tag is known
/// and the running version differs from it.
pub fn classify(deployments: &[Deployment], stable_tag: Option<&str>) -> StatusSummary {
    let status = match deployments {
        [] => DeploymentStatus::NoDeployment,
        [only] if only.percentage == 100.0 => match stable_tag {
            Some(tag) if !tag.is_empty() && tag != only.version => DeploymentStatus::VersionMismatch,
            _ => DeploymentStatus::UpToDate,
        },
        [only] if only.percentage < 100.0 => DeploymentStatus::InProgress,
        [_, _, ..] => DeploymentStatus::InProgress,
        _ => DeploymentStatus::Unknown,
    };

    status.into()
}

/// Traffic split shown in the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSplit {
    pub stable_percent: f64,
    pub canary_percent: f64,
}

/// Progress bar data for a stable/canary pair.
///
/// Rendered only when both variants exist and their nominal percentages add
/// up to exactly 100. The split itself follows the ArgoCD weight; a weight
/// that is not a number renders as an empty bar.
pub fn progress_split(deployments: &[Deployment], weight: Option<f64>) -> Option<ProgressSplit> {
    let stable = deployments.iter().find(|d| d.kind == DeploymentKind::Stable)?;
    let canary = deployments.iter().find(|d| d.kind == DeploymentKind::Canary)?;

    if stable.percentage + canary.percentage != 100.0 {
        return None;
    }

    Some(match weight {
        Some(weight) => ProgressSplit {
            stable_percent: 100.0 - weight,
            canary_percent: weight,
        },
        None => ProgressSplit {
            stable_percent: 0.0,
            canary_percent: 0.0,
        },
    })
}

/// What the first ArgoCD rollout step says about pausing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInfo {
    /// The step was not valid JSON
    Unparseable,
    /// Valid step without a `pause` key
    NoPause,
    /// A `pause` step, timed when it carries a duration
    Paused { duration: Option<String> },
}

/// Interpret a raw rollout step; never fails
pub fn parse_step(raw: &str) -> StepInfo {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Ignoring unparseable rollout step {:?}: {}", raw, e);
            return StepInfo::Unparseable;
        }
    };

    let Some(pause) = value.get("pause").filter(|p| !p.is_null()) else {
        return StepInfo::NoPause;
    };

    let duration = match pause.get("duration") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    StepInfo::Paused { duration }
}

/// Activity of an in-progress rollout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RolloutPhase {
    /// Traffic is shifting; no pause step is active
    Syncing,
    /// Paused for a fixed duration before the next step
    Paused { duration: String },
    /// Paused until someone promotes the rollout
    AwaitingManualStart,
    /// No step information available
    InProgress,
}

impl RolloutPhase {
    pub fn message(&self) -> String {
        match self {
            RolloutPhase::Syncing => "Actively syncing".to_string(),
            RolloutPhase::Paused { duration } => format!("Paused for {}", duration),
            RolloutPhase::AwaitingManualStart => "Paused, manual start required".to_string(),
            RolloutPhase::InProgress => "In Progress".to_string(),
        }
    }
}

/// Rollout activity for display; only in-progress rollouts have one
pub fn rollout_phase(status: DeploymentStatus, step: &StepInfo) -> Option<RolloutPhase> {
    if status != DeploymentStatus::InProgress {
        return None;
    }

    Some(match step {
        StepInfo::Paused {
            duration: Some(duration),
        } => RolloutPhase::Paused {
            duration: duration.clone(),
        },
        StepInfo::Paused { duration: None } => RolloutPhase::AwaitingManualStart,
        StepInfo::NoPause => RolloutPhase::Syncing,
        StepInfo::Unparseable => RolloutPhase::InProgress,
    })
}
