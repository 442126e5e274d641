//! Tab layout endpoint.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::rest::dto::{TabResponse, TabsResponse};
use crate::rest::state::ApiState;
use crate::scenario::{resolve_tabs, RequestOrigin};

/// Tabs shown next to the terminal, with URLs made absolute for the caller's host
#[utoipa::path(
    get,
    path = "/api/tabs",
    tag = "Scenario",
    responses(
        (status = 200, description = "Tab layout", body = TabsResponse)
    )
)]
pub async fn list(State(state): State<ApiState>, headers: HeaderMap) -> Json<TabsResponse> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let https = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"));

    let tabs = resolve_tabs(
        &state.tabs,
        state.config.editor.enabled,
        RequestOrigin { host, https },
    );

    Json(TabsResponse {
        tabs: tabs.into_iter().map(TabResponse::from).collect(),
        terminal_enabled: state.tabs.terminal.enabled,
    })
}
