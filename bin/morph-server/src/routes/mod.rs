//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `MORPH_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - The `/animate` relay endpoint
//! - Read-only static serving of generated artifacts under `/animations/`

pub mod animate;
pub mod doc;
pub mod health;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(animate::router());

    let mut app = Router::new()
        .merge(api_router)
        // Generated artifacts are served verbatim; a missing path is a 404.
        .nest_service(
            "/animations",
            ServeDir::new(&state.config.animations_dir),
        );

    // ── Swagger UI ────────────────────────────────────────────────────────────
    // Enabled by default; disable with MORPH_ENABLE_SWAGGER=false in
    // production to avoid exposing the API structure.
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    // Axum's default body limit (2 MiB) is below the upload cap; allow two
    // capped files plus multipart framing.
    let body_limit = state.config.max_upload_size_bytes() * 2 + 1024 * 1024;

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
