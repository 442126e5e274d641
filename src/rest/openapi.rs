//! OpenAPI specification builder using utoipa.

use utoipa::OpenApi;

use crate::rest::dto::{
    CheckResponse, HealthResponse, ScenarioResponse, StepResponse, StepSummaryResponse,
    TabResponse, TabsResponse,
};
use crate::rest::error::ErrorResponse;

/// OpenAPI documentation for the learning UI API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Learning UI API",
        description = "Scenario steps, check execution and tab layout for the in-browser learning environment."
    ),
    paths(
        crate::rest::routes::health::health,
        crate::rest::routes::scenario::get_scenario,
        crate::rest::routes::steps::list,
        crate::rest::routes::steps::get_one,
        crate::rest::routes::steps::check,
        crate::rest::routes::tabs::list,
    ),
    components(
        schemas(
            HealthResponse,
            ScenarioResponse,
            StepSummaryResponse,
            StepResponse,
            CheckResponse,
            TabsResponse,
            TabResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Scenario", description = "Scenario metadata and tab layout"),
        (name = "Steps", description = "Tutorial steps and their checks"),
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI specification as a JSON string
    pub fn json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::json().expect("Failed to generate OpenAPI spec");
        assert!(spec.contains("Learning UI API"));
        assert!(spec.contains("/api/health"));
        assert!(spec.contains("/api/steps/{number}/check"));
        assert!(spec.contains("/api/tabs"));
    }

    #[test]
    fn test_openapi_has_all_tags() {
        let spec = ApiDoc::json().expect("Failed to generate OpenAPI spec");
        assert!(spec.contains("\"Health\""));
        assert!(spec.contains("\"Scenario\""));
        assert!(spec.contains("\"Steps\""));
    }
}
