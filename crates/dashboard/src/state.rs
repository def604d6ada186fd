//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::AiAssistant;
use crate::backend::Backend;
use crate::config::StorageConfig;
use crate::geocoding::GeocodingClient;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything sits behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    backend: Arc<dyn Backend>,
    storage: StorageConfig,
    geocoding: GeocodingClient,
    ai: AiAssistant,
}

impl AppState {
    #[must_use]
    pub fn new(
        pool: PgPool,
        backend: Arc<dyn Backend>,
        storage: StorageConfig,
        geocoding: GeocodingClient,
        ai: AiAssistant,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                backend,
                storage,
                geocoding,
                ai,
            }),
        }
    }

    /// Pool for the dashboard's own tables (sessions, preferences).
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn backend(&self) -> &dyn Backend {
        self.inner.backend.as_ref()
    }

    #[must_use]
    pub fn storage(&self) -> &StorageConfig {
        &self.inner.storage
    }

    #[must_use]
    pub fn geocoding(&self) -> &GeocodingClient {
        &self.inner.geocoding
    }

    #[must_use]
    pub fn ai(&self) -> &AiAssistant {
        &self.inner.ai
    }
}
