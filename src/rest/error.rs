//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::scenario::ScenarioError;
use crate::steps::CatalogError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found
    NotFound(String),
    /// Malformed request input
    BadRequest(String),
    /// Internal server error
    InternalError(String),
}

/// Error response body.
///
/// `error` holds the message shown by the web UI; `code` names the kind.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::StepNotFound(_) => ApiError::NotFound("step not found".to_string()),
            CatalogError::NoCheck(_) => {
                ApiError::NotFound("no check script for this step".to_string())
            }
        }
    }
}

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ScenarioError::Parse { ref source, .. } => {
                tracing::warn!("Invalid scenario metadata: {}", source);
                ApiError::InternalError(err.to_string())
            }
            ScenarioError::Io { .. } => ApiError::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::path::PathBuf;

    async fn body(error: ApiError) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, json) = body(ApiError::NotFound("step not found".to_string())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.error, "step not found");
        assert_eq!(json.code, "not_found");
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let (status, json) = body(ApiError::BadRequest("invalid step number".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json.code, "bad_request");
    }

    #[tokio::test]
    async fn test_catalog_errors_keep_distinct_messages() {
        let (status, json) = body(CatalogError::StepNotFound(9).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.error, "step not found");

        let (status, json) = body(CatalogError::NoCheck(2).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.error, "no check script for this step");
    }

    #[tokio::test]
    async fn test_scenario_not_found() {
        let err = ScenarioError::NotFound(PathBuf::from("/scenarios/scenario.yaml"));
        let (status, json) = body(err.into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.error, "scenario.yaml not found");
    }
}
