//! morph-client – upload client for the animation relay.
//!
//! The heart of the crate is [`session::UploadSession`], the state machine
//! behind the upload form: an ordered selection of at most two images, a
//! style choice, and the loading / error / result flags a renderer draws
//! from.  Submission goes through the [`relay::RelayTransport`] trait so
//! the state machine stays free of HTTP concerns; [`relay::HttpRelay`] is
//! the real transport.  The companion binary drives a session from the
//! command line.

pub mod error;
pub mod relay;
pub mod session;

pub use error::ClientError;
pub use relay::{HttpRelay, RelayTransport};
pub use session::{SelectedImage, UploadSession};
