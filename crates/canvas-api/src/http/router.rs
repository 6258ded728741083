//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Project CRUD + selection
        .route("/projects", post(handlers::project::create_project))
        .route("/projects", get(handlers::project::list_projects))
        .route("/projects/{id}", get(handlers::project::get_project))
        .route("/projects/{id}", put(handlers::project::update_project))
        .route("/projects/{id}", delete(handlers::project::delete_project))
        .route(
            "/projects/{id}/select",
            post(handlers::project::select_project),
        )
        .route(
            "/projects/{id}/generate",
            post(handlers::project::generate_attributes),
        )
        // Block CRUD + selection
        .route("/blocks", post(handlers::block::create_block))
        .route("/blocks", get(handlers::block::list_blocks))
        .route(
            "/blocks/categorized",
            get(handlers::block::categorized_blocks),
        )
        .route("/blocks/{id}", get(handlers::block::get_block))
        .route("/blocks/{id}", put(handlers::block::update_block))
        .route("/blocks/{id}", delete(handlers::block::delete_block))
        .route("/blocks/{id}/select", post(handlers::block::select_block))
        // Webhook dispatch + correlation callback
        .route(
            "/webhooks/dispatch",
            post(handlers::webhook::dispatch_webhook),
        )
        .route(
            "/webhooks/response",
            post(handlers::webhook::receive_response),
        )
        .route("/webhooks/test", post(handlers::webhook::test_webhook))
        .route(
            "/webhooks/pending",
            get(handlers::webhook::pending_webhooks).delete(handlers::webhook::clear_pending),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint (not under /api/v1 for simpler probes).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
