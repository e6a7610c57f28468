//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the defaults run a local storefront with
//! in-memory sessions.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` URL for persistent sessions
//!   (falls back to `DATABASE_URL`; in-memory sessions when both are unset)
//! - `STOREFRONT_CHECKOUT_PATH` - Where checkout navigates to (default: /checkout)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog JSON file
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CATALOG_PATH: &str = "crates/storefront/content/products.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// `PostgreSQL` URL for the session store (contains password)
    pub database_url: Option<SecretString>,
    /// Path checkout redirects to once the cart is saved
    pub checkout_path: String,
    /// Product catalog file shown on the home page
    pub catalog_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| invalid("STOREFRONT_HOST", &e))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| invalid("STOREFRONT_PORT", &e))?;
        let base_url = env.or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let database_url = env
            .optional("STOREFRONT_DATABASE_URL")
            .or_else(|| env.optional("DATABASE_URL"))
            .map(SecretString::from);
        let checkout_path = env.or_default("STOREFRONT_CHECKOUT_PATH", "/checkout");
        validate_checkout_path(&checkout_path)?;
        let catalog_path = PathBuf::from(env.or_default("STOREFRONT_CATALOG_PATH", DEFAULT_CATALOG_PATH));

        Ok(Self {
            host,
            port,
            base_url,
            database_url,
            checkout_path,
            catalog_path,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable source with typed accessors.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a sampling rate in `0.0..=1.0`.
    fn sample_rate(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let Some(raw) = self.optional(key) else {
            return Ok(default);
        };
        let rate = raw.parse::<f32>().map_err(|e| invalid(key, &e))?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ));
        }
        Ok(rate)
    }
}

fn invalid(key: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
}

/// The checkout target must be a local absolute path so it cannot be turned
/// into an open redirect.
fn validate_checkout_path(path: &str) -> Result<(), ConfigError> {
    if !path.starts_with('/') || path.starts_with("//") {
        return Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_CHECKOUT_PATH".to_string(),
            format!("must be a local path starting with '/' (got {path:?})"),
        ));
    }
    Ok(())
}
