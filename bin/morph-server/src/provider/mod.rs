//! Animation provider abstraction.
//!
//! [`AnimationProvider`] defines the interface for the external
//! animation-synthesis service.  The default (and only) implementation is
//! [`runway::RunwayProvider`]; adding a second provider means implementing
//! this trait and changing the concrete type constructed in `main`, without
//! touching any handler code.  Handlers depend on `Arc<dyn
//! AnimationProvider>` via [`crate::state::AppState`], which also lets
//! tests substitute a double.

pub mod runway;

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

pub use runway::RunwayProvider;

/// The artifact body as an async stream of chunks, so it can be written to
/// disk without buffering the whole file in memory.
pub type ByteStream = BoxStream<'static, Result<Bytes, ProviderError>>;

/// Errors from talking to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout, or non-success status.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Could not read a staged input file off disk.
    #[error("failed to read staged upload: {0}")]
    Io(#[from] std::io::Error),

    /// The provider's JSON response lacked a field we depend on.
    #[error("response field `{0}` is missing")]
    MissingField(&'static str),
}

/// An uploaded image staged on disk for the duration of one relay request.
#[derive(Debug, Clone)]
pub struct StagedImage {
    /// Location of the transient file under the uploads directory.
    pub path: PathBuf,
    /// Original filename sent by the client.
    pub file_name: String,
    /// Content type sent by the client.
    pub content_type: String,
}

/// Interface to an external animation-synthesis service.
#[async_trait]
pub trait AnimationProvider: Send + Sync + 'static {
    /// Human-readable label reported in the success response
    /// (`serviceUsed`).
    fn label(&self) -> &str;

    /// Submit both images plus the style string and return the URL of the
    /// generated artifact.  The style is forwarded verbatim; no
    /// enumeration is enforced here.
    async fn submit(
        &self,
        first: &StagedImage,
        second: &StagedImage,
        style: &str,
    ) -> Result<String, ProviderError>;

    /// Open the artifact at `artifact_url` as a byte stream.
    async fn fetch(&self, artifact_url: &str) -> Result<ByteStream, ProviderError>;
}
