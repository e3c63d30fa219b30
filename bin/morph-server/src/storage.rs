//! Artifact storage.
//!
//! Generated artifacts land in a flat public directory as
//! `<unix-timestamp-ms>_animation.gif`.  Files are never updated and never
//! deleted by the server; retention is out of scope.  Filename uniqueness
//! relies on millisecond timestamp granularity.

use std::path::PathBuf;

use chrono::Utc;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::ServerError;
use crate::provider::ByteStream;

/// Fixed filename suffix; the public path returned to callers always has
/// the form `/animations/<integer>_animation.gif`.
const ARTIFACT_SUFFIX: &str = "_animation.gif";

/// A successfully persisted artifact.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    /// Bare filename under the animations directory.
    pub file_name: String,
    /// Public relative path served by the static route.
    pub public_path: String,
}

/// Writes provider artifacts into the public animations directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the animations directory if it does not exist.  Called once
    /// at process start.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Drain `stream` into a newly created timestamped file.
    ///
    /// Chunks are written as they arrive; the whole artifact is never held
    /// in memory.  If the stream or the write fails, the partial file is
    /// removed so a failed request never leaves a referencable artifact.
    pub async fn store_stream(&self, mut stream: ByteStream) -> Result<StoredArtifact, ServerError> {
        let file_name = format!("{}{}", Utc::now().timestamp_millis(), ARTIFACT_SUFFIX);
        let path = self.dir.join(&file_name);

        let mut file = tokio::fs::File::create(&path).await?;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    drop(file);
                    self.discard_partial(&path).await;
                    return Err(e.into());
                }
            };
            if let Err(e) = file.write_all(&bytes).await {
                drop(file);
                self.discard_partial(&path).await;
                return Err(e.into());
            }
        }
        file.flush().await?;

        debug!(file = %file_name, "artifact stored");

        Ok(StoredArtifact {
            public_path: format!("/animations/{file_name}"),
            file_name,
        })
    }

    async fn discard_partial(&self, path: &std::path::Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::provider::ProviderError;
    use bytes::Bytes;
    use futures::stream;

    fn ok_stream(chunks: Vec<&'static [u8]>) -> ByteStream {
        stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, ProviderError>(Bytes::from_static(c)))
                .collect::<Vec<_>>(),
        )
        .boxed()
    }

    #[tokio::test]
    async fn stores_stream_under_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.ensure_dir().await.unwrap();

        let stored = store
            .store_stream(ok_stream(vec![b"GIF8", b"9a..."]))
            .await
            .unwrap();

        let stem = stored.file_name.strip_suffix(ARTIFACT_SUFFIX).unwrap();
        assert!(stem.parse::<i64>().is_ok(), "prefix must be a timestamp: {stem}");
        assert_eq!(stored.public_path, format!("/animations/{}", stored.file_name));

        let written = std::fs::read(dir.path().join(&stored.file_name)).unwrap();
        assert_eq!(written, b"GIF89a...");
    }

    #[tokio::test]
    async fn failed_stream_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.ensure_dir().await.unwrap();

        let broken: ByteStream = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(ProviderError::MissingField("animationUrl")),
        ])
        .boxed();

        let result = store.store_stream(broken).await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
