//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** upstream and storage failures are logged with full
//! detail but only the generic `"Failed to generate animation"` message is
//! returned to the caller, so provider URLs, file paths, and other
//! implementation details never leak to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::provider::ProviderError;

/// Generic message returned for every internal failure of the relay chain.
pub const GENERATION_FAILED: &str = "Failed to generate animation";

/// All errors that can occur in the morph-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid request (wrong image count, oversize
    /// upload, unreadable multipart body).  Reported before any external
    /// call is made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The outbound call to the provider failed: network error, timeout,
    /// or a non-success status.
    #[error("upstream request failed: {0}")]
    UpstreamRequest(#[source] ProviderError),

    /// The provider answered 2xx but the response was missing the artifact
    /// URL (or was otherwise not the JSON shape we rely on).
    #[error("upstream response invalid: {0}")]
    UpstreamResponse(String),

    /// Failed to persist the artifact or manage temporary upload files.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<ProviderError> for ServerError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::MissingField(field) => {
                ServerError::UpstreamResponse(format!("response field `{field}` is missing"))
            }
            other => ServerError::UpstreamRequest(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),

            // Internal errors: log the full detail, return the generic
            // message only.
            ServerError::UpstreamRequest(e) => {
                error!(error = %e, "provider request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED.to_owned())
            }
            ServerError::UpstreamResponse(m) => {
                error!(detail = %m, "provider response invalid");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED.to_owned())
            }
            ServerError::Storage(e) => {
                error!(error = %e, "artifact storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED.to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
