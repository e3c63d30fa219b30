//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Runtime configuration for morph-server.
///
/// Read once in `main` and passed into [`crate::state::AppState`]; nothing
/// consults the process environment after startup.  Every field except the
/// provider API key has a sensible default so the server works
/// out-of-the-box.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3001"`).
    pub bind_address: String,

    /// Endpoint of the external animation provider.
    pub provider_url: String,

    /// Bearer credential sent to the provider.  Empty by default; the
    /// provider will reject unauthenticated requests, not us.
    pub provider_api_key: String,

    /// Directory holding generated artifacts, served under `/animations/`.
    pub animations_dir: PathBuf,

    /// Directory holding transient inbound uploads.
    pub uploads_dir: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Expose Swagger UI at `/swagger-ui` (default: `true`).
    pub enable_swagger: bool,

    /// Per-file upload cap in MiB (default: 25).
    pub max_upload_size_mb: usize,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("MORPH_BIND", "0.0.0.0:3001"),
            provider_url: env_or(
                "MORPH_PROVIDER_URL",
                "https://api.runwayml.com/v1/generate-animation",
            ),
            provider_api_key: env_or("MORPH_PROVIDER_API_KEY", ""),
            animations_dir: PathBuf::from(env_or("MORPH_ANIMATIONS_DIR", "animations")),
            uploads_dir: PathBuf::from(env_or("MORPH_UPLOADS_DIR", "uploads")),
            log_level: env_or("MORPH_LOG", "info"),
            log_json: std::env::var("MORPH_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("MORPH_CORS_ORIGINS").ok(),
            enable_swagger: std::env::var("MORPH_ENABLE_SWAGGER")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            max_upload_size_mb: parse_env("MORPH_MAX_UPLOAD_SIZE_MB", 25),
        }
    }

    /// The per-file upload cap in bytes.
    pub fn max_upload_size_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
