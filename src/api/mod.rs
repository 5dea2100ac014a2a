//! REST API routes for Fleetboard

mod dashboard;
mod field_sets;
mod services;

pub use dashboard::*;
pub use field_sets::*;
pub use services::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::StorageError;
use crate::debounce::Debouncer;
use crate::integrations::{BackendClient, FetchError};
use crate::session::{Dashboard, DashboardError};
use crate::store::FieldSetError;

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta {
                timestamp: Utc::now(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Upstream(String),
    StorageError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", &msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", &msg))
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", &msg)),
            AppError::Upstream(msg) => {
                (StatusCode::BAD_GATEWAY, ApiError::new("UPSTREAM_ERROR", &msg))
            }
            AppError::StorageError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("STORAGE_ERROR", &msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<FieldSetError> for AppError {
    fn from(err: FieldSetError) -> Self {
        match err {
            FieldSetError::UnknownFieldSet(_) => AppError::NotFound(err.to_string()),
            FieldSetError::DuplicateFieldSet(_) => AppError::Conflict(err.to_string()),
            FieldSetError::LastFieldSet | FieldSetError::EmptyFieldSets => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::warn!("Storage failure: {}", err);
        AppError::StorageError(err.to_string())
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::FieldSet(e) => e.into(),
            DashboardError::Storage(e) => e.into(),
            DashboardError::EmptyName => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        if err.is_not_found() {
            AppError::NotFound(err.to_string())
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

/// A debounced text-filter edit, tagged with the edit counter at push time
#[derive(Debug, Clone)]
pub struct TextFilterEdit {
    generation: u64,
    value: String,
}

/// Application state shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    pub backend: BackendClient,
    pub text_filter: Arc<Debouncer<TextFilterEdit>>,
    text_filter_generation: Arc<AtomicU64>,
}

impl AppState {
    /// Wire the session to the backend. Text-filter edits are committed to
    /// the session after `debounce` of quiet.
    pub fn new(dashboard: Dashboard, backend: BackendClient, debounce: Duration) -> Self {
        let dashboard = Arc::new(RwLock::new(dashboard));
        let generation = Arc::new(AtomicU64::new(0));

        let target = dashboard.clone();
        let latest = generation.clone();
        let text_filter = Debouncer::new(debounce, move |edit: TextFilterEdit| {
            let target = target.clone();
            let latest = latest.clone();
            async move {
                let mut dashboard = target.write().await;
                // A direct write may have landed while this commit waited for the lock
                if latest.load(Ordering::SeqCst) != edit.generation {
                    tracing::debug!("Dropping superseded text filter {:?}", edit.value);
                    return;
                }
                if let Err(e) = dashboard.set_text_filter(edit.value).await {
                    tracing::warn!("Failed to persist text filter: {}", e);
                }
            }
        });

        Self {
            dashboard,
            backend,
            text_filter: Arc::new(text_filter),
            text_filter_generation: generation,
        }
    }

    /// Schedule a debounced text-filter commit
    pub fn push_text_filter(&self, value: String) {
        let generation = self.text_filter_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.text_filter.push(TextFilterEdit { generation, value });
    }

    /// Set the text filter now, superseding any debounced edit, including
    /// one already waiting for the session lock
    pub async fn replace_text_filter(
        &self,
        dashboard: &mut Dashboard,
        value: String,
    ) -> Result<(), StorageError> {
        self.text_filter_generation.fetch_add(1, Ordering::SeqCst);
        self.text_filter.cancel();
        dashboard.set_text_filter(value).await
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Build the HTTP router
pub fn build_router(state: AppState, cors_enabled: bool) -> Router {
    let api_routes = Router::new()
        .merge(dashboard_routes())
        .nest("/field-sets", field_set_routes())
        .nest("/services", service_routes());

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}
