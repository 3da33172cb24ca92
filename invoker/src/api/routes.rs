//! API routes for the invoker service

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use invoker_cache::{CacheCoordinator, CacheError, CacheStats, ViewerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Response header naming the tier that served a recommendation
pub const CACHE_TIER_HEADER: &str = "x-cache-tier";

/// Application state
pub struct AppState {
    pub coordinator: Arc<CacheCoordinator>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub shared_cache: String,
    pub sources: Vec<String>,
    pub local_cache: CacheStats,
}

/// Recommendation query parameters
#[derive(Deserialize)]
pub struct RecommendQuery {
    pub viewer_id: Option<String>,
}

/// Error body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can answer with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("No data generated")]
    NoData,

    #[error("Internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoData => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::NoData { .. } => ApiError::NoData,
            CacheError::InvalidViewerId(reason) => ApiError::BadRequest(reason),
            other => {
                error!(error = %other, "Recommendation lookup failed");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

/// Health check endpoint
pub async fn health_check(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let coordinator = &app_state.coordinator;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        shared_cache: coordinator.shared_backend().to_string(),
        sources: coordinator
            .cascade()
            .source_names()
            .into_iter()
            .map(String::from)
            .collect(),
        local_cache: coordinator.local_stats().await,
    })
}

/// Recommendation endpoint
pub async fn recommend(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RecommendQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = params
        .viewer_id
        .ok_or_else(|| ApiError::BadRequest("viewer_id is required".to_string()))?;
    let viewer = ViewerId::parse(raw)?;

    let resolution = app_state.coordinator.get_or_compute(&viewer).await?;
    debug!(
        "Serving {} results for {} from {} tier",
        resolution.results.len(),
        viewer,
        resolution.tier
    );

    Ok((
        [(CACHE_TIER_HEADER, resolution.tier.to_string())],
        Json(resolution.results),
    ))
}
