//! Health check endpoint.

use axum::{extract::State, Json};

use crate::rest::dto::HealthResponse;
use crate::rest::state::ApiState;
use crate::steps::CatalogStatus;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service status and step count", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let (status, reason) = match state.catalog.status() {
        CatalogStatus::Loaded => ("ok", None),
        CatalogStatus::Degraded { reason } => ("degraded", Some(reason.clone())),
    };

    Json(HealthResponse {
        status: status.to_string(),
        steps: state.catalog.len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reason,
    })
}
