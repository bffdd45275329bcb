//! JSON query endpoints under `/api/metrics`.
//!
//! Field names and nesting match what the dashboard front-end consumes.
//! Collector failures become `500 {"error": "..."}`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use herakles_host_monitor::error::CollectError;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::state::SharedState;

/// Error type for query endpoint failures.
#[derive(Debug)]
pub struct ApiError(CollectError);

impl From<CollectError> for ApiError {
    fn from(e: CollectError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Query failed ({}): {}", self.0.kind(), self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Handler for `/api/metrics/history`.
#[instrument(skip(state))]
pub async fn history_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/metrics/history request");
    state.health_stats.record_http_request();
    Json(state.query.get_history())
}

/// Handler for `/api/metrics/cpu`.
#[instrument(skip(state))]
pub async fn cpu_handler(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    debug!("Processing /api/metrics/cpu request");
    state.health_stats.record_http_request();
    Ok(Json(state.query.get_cpu().await?))
}

/// Handler for `/api/metrics/memory`.
#[instrument(skip(state))]
pub async fn memory_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Processing /api/metrics/memory request");
    state.health_stats.record_http_request();
    Ok(Json(state.query.get_memory().await?))
}

/// Handler for `/api/metrics/network`.
#[instrument(skip(state))]
pub async fn network_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Processing /api/metrics/network request");
    state.health_stats.record_http_request();
    Ok(Json(state.query.get_network_interfaces().await?))
}

/// Handler for `/api/metrics/network/rates`.
#[instrument(skip(state))]
pub async fn network_rates_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/metrics/network/rates request");
    state.health_stats.record_http_request();
    Json(state.query.get_network_rates())
}

/// Handler for `/api/metrics/disks`.
#[instrument(skip(state))]
pub async fn disks_handler(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    debug!("Processing /api/metrics/disks request");
    state.health_stats.record_http_request();
    Ok(Json(state.query.get_disks().await?))
}

/// Handler for `/api/metrics/temperature`. Missing tools yield a 200 with an
/// `error`/`instructions` payload.
#[instrument(skip(state))]
pub async fn temperature_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/metrics/temperature request");
    state.health_stats.record_http_request();
    Json(state.query.get_temperatures().await)
}

/// Any other `/api/` path.
pub async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
