//! Transport to the Relay Service.
//!
//! [`RelayTransport`] is the one seam between the upload state machine and
//! the network, so session tests can substitute a stub.  [`HttpRelay`]
//! speaks the real multipart contract.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use morph_types::{AnimateResponse, AnimationStyle};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tokio::io::AsyncWriteExt;

use crate::error::ClientError;
use crate::session::SelectedImage;

/// The client's view of the `/animate` endpoint.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Submit the selected images plus the style string; returns the relay's
    /// success envelope.
    async fn animate(
        &self,
        images: &[SelectedImage],
        style: AnimationStyle,
    ) -> Result<AnimateResponse, ClientError>;
}

/// HTTP transport to a running morph-server.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent(concat!("morph-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Download a generated artifact to `dest`, streaming chunks to disk.
    /// Returns the number of bytes written.
    pub async fn download(&self, animation_url: &str, dest: &Path) -> Result<u64, ClientError> {
        let response = self
            .client
            .get(self.url(animation_url))
            .send()
            .await?
            .error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk?;
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn animate(
        &self,
        images: &[SelectedImage],
        style: AnimationStyle,
    ) -> Result<AnimateResponse, ClientError> {
        let mut form = Form::new();
        for image in images {
            let part = Part::bytes(image.bytes.to_vec())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }
        form = form.text("animationType", style.as_str());

        let response = self
            .client
            .post(self.url("/animate"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
