//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::provider::AnimationProvider;
use crate::storage::ArtifactStore;

/// State shared across all HTTP handlers.
///
/// The provider is held behind the [`AnimationProvider`] trait so the
/// concrete service is chosen once in `main` (and swapped for a double in
/// tests) without handler changes.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived, immutable after startup).
    pub config: Arc<Config>,
    /// The external animation-synthesis service.
    pub provider: Arc<dyn AnimationProvider>,
    /// Artifact persistence under the public animations directory.
    pub store: Arc<ArtifactStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("provider", &self.provider.label())
            .field("store", &self.store)
            .finish()
    }
}
