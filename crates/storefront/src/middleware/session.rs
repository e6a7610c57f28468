//! Session middleware configuration.
//!
//! Sessions carry exactly one thing: the cart slot. They are stored in
//! `PostgreSQL` when a database is configured and in memory otherwise.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cartstore_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Create the session layer around any tower-sessions store.
///
/// # Arguments
///
/// * `store` - `MemoryStore` or `PostgresStore`
/// * `config` - Storefront configuration (decides the `Secure` flag)
#[must_use]
pub fn create_session_layer<Store: SessionStore>(
    store: Store,
    config: &StorefrontConfig,
) -> SessionManagerLayer<Store> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
