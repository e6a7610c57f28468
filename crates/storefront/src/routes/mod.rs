//! HTTP route handlers for storefront.
//!
//! The router is the dispatch table for every cart control on the page.
//! It is built once at startup.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog with add-to-cart controls
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check
//!
//! # Cart (HTMX fragments, plain forms redirect back)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns fragment for the active view)
//! POST /cart/remove            - Remove item (returns fragment for the active view)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/checkout          - Save cart and redirect to checkout
//!
//! # Checkout
//! GET  /checkout               - Order summary
//!
//! # Anything else
//! *                            - 404
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;

use axum::{
    Router,
    body::Body,
    http::{Request, Uri},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show))
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Assemble the application: routes, sessions, request IDs and tracing.
///
/// Generic over the session store so the binary can pick `PostgreSQL` or
/// memory and tests can run without a database.
pub fn app<Store>(state: AppState, session_layer: SessionManagerLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    routes()
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
