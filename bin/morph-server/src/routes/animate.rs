//! The animation relay endpoint.
//!
//! Accepts exactly two images plus an optional style via
//! multipart/form-data, stages them under the uploads directory, relays
//! them to the configured provider, streams the generated artifact into
//! the public animations directory, deletes the staged inputs, and
//! returns the artifact's public path.
//!
//! The request is strictly linear: validate → submit → fetch → store →
//! clean up → respond.  Any failure short-circuits to the error response;
//! staged inputs are only deleted on the fully-successful path.

use std::sync::Arc;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use morph_types::AnimateResponse;

use crate::error::ServerError;
use crate::provider::{AnimationProvider, StagedImage};
use crate::state::AppState;

/// Multipart field holding the two image files.
const IMAGES_FIELD: &str = "images";
/// Multipart field holding the style selector.
const STYLE_FIELD: &str = "animationType";
/// Style forwarded to the provider when the client sends none.
const DEFAULT_STYLE: &str = "morph";
/// Error message for a wrong image count.
const TWO_IMAGES_REQUIRED: &str = "Two images are required";

#[derive(OpenApi)]
#[openapi(paths(animate))]
pub struct AnimateApi;

/// Multipart form fields for `POST /animate` (documentation schema).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnimateUpload {
    /// Exactly two image files.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<String>,
    /// Optional style selector; forwarded verbatim, defaults to `morph`.
    #[serde(rename = "animationType")]
    pub animation_type: Option<String>,
}

/// Register the animation relay route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/animate", post(animate))
}

/// Generate an animation from two images (`POST /animate`).
///
/// Relays the upload to the external provider and responds with the
/// public path of the stored artifact.  No external call is made unless
/// exactly two images are present.
#[utoipa::path(
    post,
    path = "/animate",
    tag = "animate",
    request_body(content = AnimateUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Animation generated", body = AnimateResponse),
        (status = 400, description = "Wrong image count or oversize upload", body = morph_types::ErrorResponse),
        (status = 500, description = "Provider or storage failure", body = morph_types::ErrorResponse),
    )
)]
pub async fn animate(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnimateResponse>, ServerError> {
    let mut images: Vec<StagedImage> = Vec::new();
    let mut style: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        match field.name().unwrap_or("") {
            IMAGES_FIELD => {
                if images.len() == 2 {
                    // A third file means the count invariant is already
                    // broken; reject before reading it.
                    return Err(ServerError::Validation(TWO_IMAGES_REQUIRED.into()));
                }
                images.push(stage_upload(&mut field, &state).await?);
            }
            STYLE_FIELD => {
                style = Some(field.text().await.map_err(|e| {
                    ServerError::Validation(format!("Failed to read style field: {e}"))
                })?);
            }
            // Unknown fields are ignored, as the original form may carry
            // extras we do not care about.
            _ => {}
        }
    }

    if images.len() != 2 {
        return Err(ServerError::Validation(TWO_IMAGES_REQUIRED.into()));
    }

    let style = style.unwrap_or_else(|| DEFAULT_STYLE.to_owned());
    debug!(style = %style, provider = state.provider.label(), "relaying animation request");

    let artifact_url = state.provider.submit(&images[0], &images[1], &style).await?;
    let stream = state.provider.fetch(&artifact_url).await?;
    let stored = state.store.store_stream(stream).await?;

    // Clean up the staged inputs.  Success path only: a failure above has
    // already returned, leaving the files behind (accepted leak).
    for image in &images {
        tokio::fs::remove_file(&image.path).await?;
    }

    info!(
        artifact = %stored.public_path,
        provider = state.provider.label(),
        "animation generated"
    );

    Ok(Json(AnimateResponse {
        animation_url: stored.public_path,
        service_used: state.provider.label().to_owned(),
    }))
}

/// Drain one multipart file field to a transient file under the uploads
/// directory, enforcing the per-file size cap while streaming.
async fn stage_upload(
    field: &mut Field<'_>,
    state: &AppState,
) -> Result<StagedImage, ServerError> {
    let file_name = field.file_name().unwrap_or("upload").to_owned();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();

    let max_bytes = state.config.max_upload_size_bytes();
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ServerError::Validation(format!("Failed to read file chunk: {e}")))?
    {
        buf.extend_from_slice(&chunk);
        if buf.len() > max_bytes {
            return Err(ServerError::Validation(format!(
                "File too large: {} bytes exceeds maximum of {}MB",
                buf.len(),
                state.config.max_upload_size_mb
            )));
        }
    }

    let path = state
        .config
        .uploads_dir
        .join(format!("{}_{}", Uuid::new_v4(), sanitize_filename(&file_name)));
    tokio::fs::write(&path, &buf).await?;

    debug!(
        file_name = %file_name,
        content_type = %content_type,
        size_bytes = buf.len(),
        staged = %path.display(),
        "staged uploaded image"
    );

    Ok(StagedImage {
        path,
        file_name,
        content_type,
    })
}

/// Sanitize a client-supplied filename to prevent directory traversal.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::provider::{ByteStream, ProviderError};
    use crate::routes;
    use crate::storage::ArtifactStore;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use bytes::Bytes;
    use futures::StreamExt;
    use futures::stream;
    use morph_types::AnimateResponse;

    const ARTIFACT_BYTES: &[u8] = b"GIF89a-mock-artifact";

    enum Behavior {
        Succeed,
        FailSubmit,
        MissingUrl,
        FailFetch,
        FailMidStream,
    }

    struct MockProvider {
        behavior: Behavior,
        submit_calls: AtomicUsize,
        seen_style: Mutex<Option<String>>,
    }

    impl MockProvider {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                submit_calls: AtomicUsize::new(0),
                seen_style: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl AnimationProvider for MockProvider {
        fn label(&self) -> &str {
            "Mock"
        }

        async fn submit(
            &self,
            first: &StagedImage,
            _second: &StagedImage,
            style: &str,
        ) -> Result<String, ProviderError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_style.lock().unwrap() = Some(style.to_owned());
            // The staged input must actually be on disk when we are called.
            assert!(first.path.exists(), "staged upload missing at submit time");
            match self.behavior {
                Behavior::FailSubmit => {
                    Err(ProviderError::Io(std::io::Error::other("connection refused")))
                }
                Behavior::MissingUrl => Err(ProviderError::MissingField("animationUrl")),
                _ => Ok("mock://artifact".to_owned()),
            }
        }

        async fn fetch(&self, artifact_url: &str) -> Result<ByteStream, ProviderError> {
            assert_eq!(artifact_url, "mock://artifact");
            match self.behavior {
                Behavior::FailFetch => {
                    Err(ProviderError::Io(std::io::Error::other("artifact gone")))
                }
                Behavior::FailMidStream => Ok(stream::iter(vec![
                    Ok(Bytes::from_static(b"partial")),
                    Err(ProviderError::Io(std::io::Error::other("stream reset"))),
                ])
                .boxed()),
                _ => Ok(stream::iter(vec![
                    Ok(Bytes::from_static(&ARTIFACT_BYTES[..6])),
                    Ok(Bytes::from_static(&ARTIFACT_BYTES[6..])),
                ])
                .boxed()),
            }
        }
    }

    struct TestApp {
        server: TestServer,
        provider: Arc<MockProvider>,
        animations_dir: std::path::PathBuf,
        uploads_dir: std::path::PathBuf,
        _root: tempfile::TempDir,
    }

    fn test_app(behavior: Behavior) -> TestApp {
        let root = tempfile::tempdir().unwrap();
        let animations_dir = root.path().join("animations");
        let uploads_dir = root.path().join("uploads");
        std::fs::create_dir_all(&animations_dir).unwrap();
        std::fs::create_dir_all(&uploads_dir).unwrap();

        let config = Config {
            bind_address: "127.0.0.1:0".into(),
            provider_url: "http://provider.invalid".into(),
            provider_api_key: "test-key".into(),
            animations_dir: animations_dir.clone(),
            uploads_dir: uploads_dir.clone(),
            log_level: "info".into(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: false,
            max_upload_size_mb: 1,
        };

        let provider = MockProvider::new(behavior);
        let state = Arc::new(AppState {
            config: Arc::new(config),
            provider: provider.clone(),
            store: Arc::new(ArtifactStore::new(&animations_dir)),
        });

        TestApp {
            server: TestServer::new(routes::build(state)).unwrap(),
            provider,
            animations_dir,
            uploads_dir,
            _root: root,
        }
    }

    fn image_part(name: &str) -> Part {
        Part::bytes(&b"not-actually-a-png"[..]).file_name(name.to_owned())
    }

    fn two_image_form() -> MultipartForm {
        MultipartForm::new()
            .add_part("images", image_part("a.png"))
            .add_part("images", image_part("b.png"))
    }

    fn dir_entry_count(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn two_images_yield_artifact_and_clean_uploads() {
        let app = test_app(Behavior::Succeed);

        let response = app.server.post("/animate").multipart(two_image_form()).await;
        response.assert_status(StatusCode::OK);

        let body: AnimateResponse = response.json();
        assert_eq!(body.service_used, "Mock");

        // Path shape: /animations/<integer>_animation.gif
        let stem = body
            .animation_url
            .strip_prefix("/animations/")
            .and_then(|s| s.strip_suffix("_animation.gif"))
            .expect("unexpected artifact path shape");
        stem.parse::<i64>().expect("artifact prefix is not a timestamp");

        // The artifact exists and is immediately fetchable.
        assert_eq!(dir_entry_count(&app.animations_dir), 1);
        let fetched = app.server.get(&body.animation_url).await;
        fetched.assert_status(StatusCode::OK);
        assert_eq!(fetched.as_bytes().as_ref(), ARTIFACT_BYTES);

        // Both staged inputs were deleted on the success path.
        assert_eq!(dir_entry_count(&app.uploads_dir), 0);
    }

    #[tokio::test]
    async fn missing_style_defaults_to_morph() {
        let app = test_app(Behavior::Succeed);
        app.server
            .post("/animate")
            .multipart(two_image_form())
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(
            app.provider.seen_style.lock().unwrap().as_deref(),
            Some("morph")
        );
    }

    #[tokio::test]
    async fn style_is_forwarded_verbatim() {
        let app = test_app(Behavior::Succeed);
        app.server
            .post("/animate")
            .multipart(two_image_form().add_text("animationType", "anything-goes"))
            .await
            .assert_status(StatusCode::OK);
        assert_eq!(
            app.provider.seen_style.lock().unwrap().as_deref(),
            Some("anything-goes")
        );
    }

    #[tokio::test]
    async fn one_image_is_rejected_without_provider_call() {
        let app = test_app(Behavior::Succeed);

        let response = app
            .server
            .post("/animate")
            .multipart(MultipartForm::new().add_part("images", image_part("a.png")))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["error"], TWO_IMAGES_REQUIRED);
        assert_eq!(app.provider.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(dir_entry_count(&app.animations_dir), 0);
    }

    #[tokio::test]
    async fn zero_images_are_rejected_without_provider_call() {
        let app = test_app(Behavior::Succeed);

        let response = app
            .server
            .post("/animate")
            .multipart(MultipartForm::new().add_text("animationType", "morph"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.provider.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn three_images_are_rejected_without_provider_call() {
        let app = test_app(Behavior::Succeed);

        let response = app
            .server
            .post("/animate")
            .multipart(two_image_form().add_part("images", image_part("c.png")))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<serde_json::Value>()["error"], TWO_IMAGES_REQUIRED);
        assert_eq!(app.provider.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_yields_500_and_no_artifact() {
        let app = test_app(Behavior::FailSubmit);

        let response = app.server.post("/animate").multipart(two_image_form()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<serde_json::Value>()["error"],
            crate::error::GENERATION_FAILED
        );
        assert_eq!(dir_entry_count(&app.animations_dir), 0);
    }

    #[tokio::test]
    async fn missing_artifact_url_yields_500_and_no_artifact() {
        let app = test_app(Behavior::MissingUrl);

        let response = app.server.post("/animate").multipart(two_image_form()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dir_entry_count(&app.animations_dir), 0);
    }

    #[tokio::test]
    async fn fetch_failure_yields_500_and_no_artifact() {
        let app = test_app(Behavior::FailFetch);

        let response = app.server.post("/animate").multipart(two_image_form()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dir_entry_count(&app.animations_dir), 0);
    }

    #[tokio::test]
    async fn mid_stream_failure_leaves_no_partial_artifact() {
        let app = test_app(Behavior::FailMidStream);

        let response = app.server.post("/animate").multipart(two_image_form()).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(dir_entry_count(&app.animations_dir), 0);
    }

    #[tokio::test]
    async fn oversize_upload_is_rejected() {
        let app = test_app(Behavior::Succeed);

        // Config caps uploads at 1 MiB; send a bit more.
        let oversized = vec![0u8; 1024 * 1024 + 1];
        let response = app
            .server
            .post("/animate")
            .multipart(
                MultipartForm::new()
                    .add_part("images", Part::bytes(oversized).file_name("big.png"))
                    .add_part("images", image_part("b.png")),
            )
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(app.provider.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        let app = test_app(Behavior::Succeed);

        let response = app
            .server
            .post("/animate")
            .multipart(two_image_form().add_text("someExtra", "ignored"))
            .await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn absent_artifact_path_is_404() {
        let app = test_app(Behavior::Succeed);
        app.server
            .get("/animations/0_animation.gif")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("photo-1.png"), "photo-1.png");
    }
}
