//! Upload form state machine.
//!
//! Mirrors what an interactive upload form tracks: the selected images
//! (capped at two), the chosen style, and the loading / error / result
//! flags.  Rendering is a pure function of this state and lives with the
//! caller; the session itself owns no presentation.

use bytes::Bytes;
use morph_types::AnimationStyle;
use tracing::warn;

use crate::relay::RelayTransport;

/// Maximum number of selectable images; excess additions are truncated,
/// not rejected.
pub const MAX_IMAGES: usize = 2;

/// Static user-facing message for any failed submission.  The underlying
/// cause is logged, never shown.
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to generate animation. Please try again.";

/// An image the user has picked, held in memory until submission.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    /// Original filename, forwarded in the multipart part.
    pub file_name: String,
    /// Content type guessed from the filename.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

/// State behind the upload form.
#[derive(Debug, Default)]
pub struct UploadSession {
    images: Vec<SelectedImage>,
    style: AnimationStyle,
    loading: bool,
    error: Option<String>,
    result: Option<String>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly chosen images, keeping at most [`MAX_IMAGES`] in
    /// original insertion order.  Clears any existing error.
    pub fn add_images(&mut self, new_images: impl IntoIterator<Item = SelectedImage>) {
        self.images.extend(new_images);
        self.images.truncate(MAX_IMAGES);
        self.error = None;
    }

    /// Remove the image at `index`, shifting subsequent entries.
    /// Out-of-range indices are ignored.
    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }

    pub fn set_style(&mut self, style: AnimationStyle) {
        self.style = style;
    }

    /// Whether the submit control is enabled: exactly two images selected
    /// and no submission in flight.
    pub fn can_submit(&self) -> bool {
        self.images.len() == MAX_IMAGES && !self.loading
    }

    /// Submit the selection through `relay`.
    ///
    /// A no-op when [`can_submit`](Self::can_submit) is false.  On success
    /// the returned artifact path becomes the result; on any failure a
    /// static retry-suggesting message becomes the error.  The loading
    /// flag is cleared when the call settles either way.
    pub async fn submit(&mut self, relay: &dyn RelayTransport) {
        if !self.can_submit() {
            return;
        }

        self.loading = true;
        self.error = None;

        match relay.animate(&self.images, self.style).await {
            Ok(response) => {
                self.result = Some(response.animation_url);
            }
            Err(e) => {
                warn!(error = %e, "animation request failed");
                self.error = Some(SUBMIT_FAILED_MESSAGE.to_owned());
            }
        }

        self.loading = false;
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn images(&self) -> &[SelectedImage] {
        &self.images
    }

    pub fn style(&self) -> AnimationStyle {
        self.style
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Public path of the generated artifact, once a submission succeeded.
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
