//! cartstore storefront - catalog, cart and checkout pages.
//!
//! This binary serves the storefront on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework with HTMX for interactivity
//! - Askama templates for server-side rendering
//! - Cart kept in the visitor's session under the `shoppingCart` slot
//! - Sessions in `PostgreSQL` when a database URL is configured, in memory otherwise

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use cartstore_storefront::catalog::Catalog;
use cartstore_storefront::config::StorefrontConfig;
use cartstore_storefront::middleware::create_session_layer;
use cartstore_storefront::state::AppState;
use cartstore_storefront::{db, routes};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::services::ServeDir;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "cartstore_storefront=info,cartstore_core=info,tower_http=debug".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let catalog = Catalog::load(&config.catalog_path).expect("Failed to load product catalog");
    tracing::info!(products = catalog.len(), "Catalog loaded");

    // Sessions hold the cart slot; persist them when a database is available
    let app: Router = match &config.database_url {
        Some(database_url) => {
            let pool = db::create_pool(database_url)
                .await
                .expect("Failed to create database pool");
            let store = PostgresStore::new(pool.clone());
            store
                .migrate()
                .await
                .expect("Failed to migrate session store");
            tracing::info!("Using PostgreSQL session store");

            let session_layer = create_session_layer(store, &config);
            let state = AppState::new(config.clone(), catalog, Some(pool));
            routes::app(state, session_layer)
        }
        None => {
            tracing::warn!("No database configured, carts will not survive a restart");
            let session_layer = create_session_layer(MemoryStore::default(), &config);
            let state = AppState::new(config.clone(), catalog, None);
            routes::app(state, session_layer)
        }
    };

    let app = app
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
