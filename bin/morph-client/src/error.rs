use thiserror::Error;

/// Errors that can be returned by morph-client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP call to the relay failed: network error, timeout, or a
    /// non-2xx status.
    #[error("request to relay failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A local file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
