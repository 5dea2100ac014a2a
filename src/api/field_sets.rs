//! Field-set routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{CustomFieldSet, FieldUpdate, MoveDirection, ViewMode};
use crate::store::{FieldSetAction, FieldSetState};

use super::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateFieldSetRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveFieldRequest {
    pub direction: MoveDirection,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModeResponse {
    pub view_mode: ViewMode,
}

/// Create field-set routes
pub fn field_set_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_field_sets).post(create_field_set))
        .route("/active", put(set_active_set))
        .route("/view-mode", post(toggle_view_mode))
        .route("/:set_id", put(update_field_set).delete(delete_field_set))
        .route("/:set_id/fields/:field_id", patch(update_field))
        .route("/:set_id/fields/:field_id/move", post(move_field))
}

async fn list_field_sets(State(state): State<AppState>) -> Json<ApiResponse<FieldSetState>> {
    let dashboard = state.dashboard.read().await;
    Json(ApiResponse::new(dashboard.state().clone()))
}

async fn create_field_set(
    State(state): State<AppState>,
    Json(req): Json<CreateFieldSetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomFieldSet>>), AppError> {
    let set = state.dashboard.write().await.create_field_set(&req.name).await?;
    tracing::info!("Created field set {} ({})", set.name, set.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::new(set))))
}

async fn set_active_set(
    State(state): State<AppState>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<FieldSetState>>, AppError> {
    let mut dashboard = state.dashboard.write().await;
    dashboard.dispatch(FieldSetAction::SetActiveSet(req.id)).await?;
    Ok(Json(ApiResponse::new(dashboard.state().clone())))
}

async fn toggle_view_mode(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ViewModeResponse>>, AppError> {
    let view_mode = state.dashboard.write().await.toggle_view_mode().await?;
    Ok(Json(ApiResponse::new(ViewModeResponse { view_mode })))
}

async fn update_field_set(
    State(state): State<AppState>,
    Path(set_id): Path<String>,
    Json(set): Json<CustomFieldSet>,
) -> Result<Json<ApiResponse<CustomFieldSet>>, AppError> {
    if set.id != set_id {
        return Err(AppError::BadRequest(format!(
            "Field set id {} does not match path {}",
            set.id, set_id
        )));
    }

    state
        .dashboard
        .write()
        .await
        .dispatch(FieldSetAction::UpdateFieldSet(set.clone()))
        .await?;
    Ok(Json(ApiResponse::new(set)))
}

async fn delete_field_set(
    State(state): State<AppState>,
    Path(set_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .dashboard
        .write()
        .await
        .dispatch(FieldSetAction::DeleteFieldSet(set_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_field(
    State(state): State<AppState>,
    Path((set_id, field_id)): Path<(String, String)>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<ApiResponse<CustomFieldSet>>, AppError> {
    edit_set(&state, &set_id, |set| {
        if set.update_field(&field_id, &update) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Field {} not found", field_id)))
        }
    })
    .await
}

async fn move_field(
    State(state): State<AppState>,
    Path((set_id, field_id)): Path<(String, String)>,
    Json(req): Json<MoveFieldRequest>,
) -> Result<Json<ApiResponse<CustomFieldSet>>, AppError> {
    edit_set(&state, &set_id, |set| {
        let index = set
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| AppError::NotFound(format!("Field {} not found", field_id)))?;
        set.move_field(index, req.direction);
        Ok(())
    })
    .await
}

/// Copy a set, edit the copy and store it back
async fn edit_set<F>(
    state: &AppState,
    set_id: &str,
    edit: F,
) -> Result<Json<ApiResponse<CustomFieldSet>>, AppError>
where
    F: FnOnce(&mut CustomFieldSet) -> Result<(), AppError>,
{
    let mut dashboard = state.dashboard.write().await;
    let mut set = dashboard
        .state()
        .get(set_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Field set not found: {}", set_id)))?;

    edit(&mut set)?;

    dashboard
        .dispatch(FieldSetAction::UpdateFieldSet(set.clone()))
        .await?;
    Ok(Json(ApiResponse::new(set)))
}
