//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The cart itself is not held
/// here: each visitor's cart lives in their session and is loaded per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Products listed on the home page
    /// * `pool` - `PostgreSQL` pool when sessions are database-backed
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog, pool: Option<PgPool>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                pool,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get the database pool, if sessions are stored in `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
