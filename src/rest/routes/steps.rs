//! Step catalog and check endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::rest::dto::{CheckResponse, StepResponse, StepSummaryResponse};
use crate::rest::error::{ApiError, ErrorResponse};
use crate::rest::state::ApiState;

/// Parse a 1-based step number from the path
pub fn parse_step_number(raw: &str) -> Result<usize, ApiError> {
    match raw.parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number),
        _ => Err(ApiError::BadRequest("invalid step number".to_string())),
    }
}

/// List all steps in order
#[utoipa::path(
    get,
    path = "/api/steps",
    tag = "Steps",
    responses(
        (status = 200, description = "Ordered step summaries", body = Vec<StepSummaryResponse>)
    )
)]
pub async fn list(State(state): State<ApiState>) -> Json<Vec<StepSummaryResponse>> {
    Json(
        state
            .catalog
            .list()
            .into_iter()
            .map(StepSummaryResponse::from)
            .collect(),
    )
}

/// Get a single step with its content
#[utoipa::path(
    get,
    path = "/api/steps/{number}",
    tag = "Steps",
    params(
        ("number" = usize, Path, description = "1-based step number")
    ),
    responses(
        (status = 200, description = "Step details", body = StepResponse),
        (status = 400, description = "Invalid step number", body = ErrorResponse),
        (status = 404, description = "Step not found", body = ErrorResponse)
    )
)]
pub async fn get_one(
    State(state): State<ApiState>,
    Path(number): Path<String>,
) -> Result<Json<StepResponse>, ApiError> {
    let number = parse_step_number(&number)?;
    let step = state.catalog.get(number)?;
    Ok(Json(StepResponse::new(number, step)))
}

/// Run the step's check script against the target
#[utoipa::path(
    post,
    path = "/api/steps/{number}/check",
    tag = "Steps",
    params(
        ("number" = usize, Path, description = "1-based step number")
    ),
    responses(
        (status = 200, description = "Check result; a failed check is still a 200", body = CheckResponse),
        (status = 400, description = "Invalid step number", body = ErrorResponse),
        (status = 404, description = "Step not found or has no check", body = ErrorResponse)
    )
)]
pub async fn check(
    State(state): State<ApiState>,
    Path(number): Path<String>,
) -> Result<Json<CheckResponse>, ApiError> {
    let number = parse_step_number(&number)?;
    let script = state.catalog.check_script_for(number)?;

    info!(step = number, "Running check");
    let outcome = state.checks.run(script).await;
    Ok(Json(CheckResponse::from(outcome)))
}
