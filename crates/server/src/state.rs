//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::store::memory::{MemoryArtisanStore, MemoryBlobStore, MemoryProductStore};
use crate::store::postgres::{PgArtisanStore, PgBlobStore, PgProductStore};
use crate::store::{ArtisanStore, BlobStore, ProductStore};

/// The store implementations injected into [`AppState`].
///
/// Constructed once at startup and never replaced; there are no global
/// store handles anywhere else in the crate.
pub struct Stores {
    pub artisans: Arc<dyn ArtisanStore>,
    pub products: Arc<dyn ProductStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            artisans: Arc::new(PgArtisanStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            blobs: Arc::new(PgBlobStore::new(pool.clone())),
        }
    }

    /// In-memory stores, used by the test suites.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            artisans: Arc::new(MemoryArtisanStore::new()),
            products: Arc::new(MemoryProductStore::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    stores: Stores,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `pool` is the database pool backing the stores, if any; the
    /// readiness probe uses it and the in-memory configuration passes
    /// `None`.
    #[must_use]
    pub fn new(config: ServerConfig, stores: Stores, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                stores,
                pool,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the artisan store.
    #[must_use]
    pub fn artisans(&self) -> &dyn ArtisanStore {
        self.inner.stores.artisans.as_ref()
    }

    /// Get the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.stores.products.as_ref()
    }

    /// Get the blob store.
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.stores.blobs.as_ref()
    }

    /// Get the database pool, if the state is database-backed.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
