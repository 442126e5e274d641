//! Scenario metadata endpoint.

use axum::{extract::State, Json};

use crate::rest::dto::ScenarioResponse;
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;
use crate::scenario::load_scenario;

/// Scenario metadata with the number of loaded steps
#[utoipa::path(
    get,
    path = "/api/scenario",
    tag = "Scenario",
    responses(
        (status = 200, description = "Scenario metadata", body = ScenarioResponse),
        (status = 404, description = "scenario.yaml missing", body = ErrorResponse),
        (status = 500, description = "scenario.yaml invalid", body = ErrorResponse)
    )
)]
pub async fn get_scenario(
    State(state): State<ApiState>,
) -> Result<Json<ScenarioResponse>, ApiError> {
    let meta = load_scenario(&state.config.scenario_path()).await?;
    Ok(Json(ScenarioResponse::new(meta, state.catalog.len())))
}
