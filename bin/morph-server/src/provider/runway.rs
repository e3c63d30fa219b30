//! Runway ML provider.
//!
//! Builds the outbound multipart request (`image1`, `image2`,
//! `animationType`), authenticates with a bearer token, and extracts the
//! `animationUrl` field from the JSON job result.  No retry is attempted;
//! a transient provider failure surfaces to the caller as a failed
//! submission.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::{AnimationProvider, ByteStream, ProviderError, StagedImage};
use crate::config::Config;

/// The single hard-coded provider.
pub struct RunwayProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RunwayProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("morph-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.provider_url.clone(), cfg.provider_api_key.clone())
    }
}

impl std::fmt::Debug for RunwayProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The API key stays out of Debug output.
        f.debug_struct("RunwayProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AnimationProvider for RunwayProvider {
    fn label(&self) -> &str {
        "Runway ML"
    }

    async fn submit(
        &self,
        first: &StagedImage,
        second: &StagedImage,
        style: &str,
    ) -> Result<String, ProviderError> {
        let form = Form::new()
            .part("image1", file_part(first).await?)
            .part("image2", file_part(second).await?)
            .text("animationType", style.to_owned());

        debug!(endpoint = %self.endpoint, style = %style, "submitting generation job");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body: serde_json::Value = response.json().await?;
        body["animationUrl"]
            .as_str()
            .map(str::to_owned)
            .ok_or(ProviderError::MissingField("animationUrl"))
    }

    async fn fetch(&self, artifact_url: &str) -> Result<ByteStream, ProviderError> {
        let response = self
            .client
            .get(artifact_url)
            .send()
            .await?
            .error_for_status()?;

        Ok(response
            .bytes_stream()
            .map_err(ProviderError::Request)
            .boxed())
    }
}

/// Build a streaming multipart part from a staged upload, so large inputs
/// are not buffered in memory on the way out.
async fn file_part(image: &StagedImage) -> Result<Part, ProviderError> {
    let file = tokio::fs::File::open(&image.path).await?;
    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
    let part = Part::stream(body)
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)?;
    Ok(part)
}
