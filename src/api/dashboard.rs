//! Dashboard grid and text-filter routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::ViewMode;
use crate::session::DashboardView;

use super::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Replaces the stored text filter when present
    pub q: Option<String>,
    pub view: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextFilterRequest {
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFilterAccepted {
    pub value: String,
    pub debounce_ms: u64,
}

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/text-filter", put(set_text_filter))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<ApiResponse<DashboardView>>, AppError> {
    let view_mode = params
        .view
        .as_deref()
        .map(str::parse::<ViewMode>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let repositories = state.backend.list_repositories_with_retry().await?;

    let mut dashboard = state.dashboard.write().await;
    dashboard.set_repositories(&repositories).await?;
    if let Some(q) = params.q {
        state.replace_text_filter(&mut dashboard, q).await?;
    }

    let view = match view_mode {
        Some(mode) => dashboard.render_as(mode),
        None => dashboard.render(),
    };
    tracing::debug!("Rendered {} of {} records", view.records.len(), view.total);

    Ok(Json(ApiResponse::new(view)))
}

async fn set_text_filter(
    State(state): State<AppState>,
    Json(req): Json<TextFilterRequest>,
) -> (StatusCode, Json<ApiResponse<TextFilterAccepted>>) {
    state.push_text_filter(req.value.clone());

    let accepted = TextFilterAccepted {
        value: req.value,
        debounce_ms: state.text_filter.delay().as_millis() as u64,
    };
    (StatusCode::ACCEPTED, Json(ApiResponse::new(accepted)))
}
