//! HTTP surface of the learning UI.
//!
//! JSON endpoints for the scenario and its steps, the terminal WebSocket and,
//! when a web root is configured, the static web UI with an `index.html`
//! fallback for client-side routes.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::ApiState;

/// Build the API router with all routes
pub fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_root = state.config.web_root();

    let router = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/scenario", get(routes::scenario::get_scenario))
        .route("/api/steps", get(routes::steps::list))
        .route("/api/steps/:number", get(routes::steps::get_one))
        .route("/api/steps/:number/check", post(routes::steps::check))
        .route("/api/tabs", get(routes::tabs::list))
        .route("/api/openapi.json", get(openapi_json))
        .route("/ws/terminal", get(routes::terminal::connect));

    let router = match web_root {
        Some(root) => router.fallback_service(static_files(&root)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn static_files(root: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(root).fallback(ServeFile::new(root.join("index.html")))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Start the HTTP server and run until it fails
pub async fn serve(state: ApiState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Learning UI listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
