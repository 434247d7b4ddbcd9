//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::IntoResponse,
    routing::{get, options, post},
    Json, Router,
};
use participium_core::Config;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc;
use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        // Resumable photo uploads
        .route("/photos", options(handlers::photo_upload::upload_options))
        .route(
            "/photos/{photo_id}",
            post(handlers::photo_upload::create_upload)
                .patch(handlers::photo_upload::append_upload)
                .head(handlers::photo_upload::upload_status)
                .delete(handlers::photo_upload::delete_upload),
        )
        // Reports
        .route(
            "/reports",
            post(handlers::reports::create_report).get(handlers::reports::list_reports),
        )
        .route("/reports/{report_id}", get(handlers::reports::get_report))
        .route(
            "/reports/{report_id}/assign",
            post(handlers::reports::assign_report),
        )
        .route(
            "/reports/{report_id}/reject",
            post(handlers::reports::reject_report),
        )
        // Officers
        .route(
            "/officers",
            post(handlers::officers::create_officer).get(handlers::officers::list_officers),
        )
        // Telegram bot boundary
        .route(
            "/telegram/webhook",
            post(handlers::telegram::telegram_webhook),
        )
        .with_state(state);

    // Uploads carry whole payloads; leave headroom over the photo cap for
    // multipart framing.
    let body_limit = config.max_upload_size_bytes * (crate::constants::MAX_PHOTOS_PER_REPORT + 1);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/openapi.json", get(openapi_spec))
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .nest(API_PREFIX, api_routes)
        // tower-http enforces the configured limit; axum's built-in 2 MiB
        // default would otherwise reject large uploads before the handler.
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.is_empty() {
        // No explicit origins configured: stay permissive for development.
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin {}: {}", origin, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn openapi_spec() -> impl IntoResponse {
    Json(api_doc::ApiDoc::openapi())
}
