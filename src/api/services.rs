//! Service detail routes

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::deploy::{AppSortColumn, ServiceView, SortDirection};

use super::{ApiResponse, AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ServiceParams {
    #[serde(default)]
    pub search: String,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

/// Create service detail routes
pub fn service_routes() -> Router<AppState> {
    Router::new().route("/:repo", get(get_service))
}

async fn get_service(
    State(state): State<AppState>,
    Path(repo): Path<String>,
    Query(params): Query<ServiceParams>,
) -> Result<Json<ApiResponse<ServiceView>>, AppError> {
    let column = match params.sort.as_deref() {
        Some(sort) => sort.parse::<AppSortColumn>().map_err(AppError::BadRequest)?,
        None => AppSortColumn::default(),
    };
    let direction = match params.direction.as_deref() {
        Some(direction) => direction
            .parse::<SortDirection>()
            .map_err(AppError::BadRequest)?,
        None => SortDirection::default(),
    };

    let detail = state.backend.get_repository_with_retry(&repo).await?;
    let view = ServiceView::build(&repo, &detail, &params.search, column, direction);
    tracing::debug!("Service {} has {} apps", repo, view.apps.len());

    Ok(Json(ApiResponse::new(view)))
}
