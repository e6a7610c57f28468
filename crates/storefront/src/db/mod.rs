//! `PostgreSQL` access for the storefront.
//!
//! The database is optional. When configured it only backs the session store
//! (tower-sessions-sqlx-store), so a visitor's cart slot survives restarts.
//!
//! ## Tables
//!
//! - `tower_sessions.session` - created by `PostgresStore::migrate` at startup

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Check that the database answers a trivial query.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
