//! HTMX request detection.
//!
//! Cart mutations answer HTMX requests with a fragment for the page the
//! control lives on, and plain form posts with a redirect back to that page.

use axum::{extract::FromRequestParts, http::request::Parts};
use cartstore_core::View;

/// Set by htmx on every request it issues.
pub const HX_REQUEST: &str = "hx-request";
/// The browser URL at the time of an htmx request.
pub const HX_CURRENT_URL: &str = "hx-current-url";
/// Response header asking htmx to fire client-side events.
pub const HX_TRIGGER: &str = "HX-Trigger";
/// Event fired after every cart change so badges refresh.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// What the request tells us about its origin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Htmx {
    /// Whether htmx issued the request.
    pub is_request: bool,
    /// View of the page the request came from, if any header names it.
    pub origin: Option<View>,
}

impl Htmx {
    /// The view to re-render after a mutation.
    #[must_use]
    pub fn active_view(&self, fallback: View) -> View {
        self.origin.unwrap_or(fallback)
    }
}

impl<S> FromRequestParts<S> for Htmx
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };

        let is_request = header(HX_REQUEST) == Some("true");
        let origin = header(HX_CURRENT_URL)
            .or_else(|| header(axum::http::header::REFERER.as_str()))
            .map(View::from_path);

        Ok(Self { is_request, origin })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(headers: &[(&str, &str)]) -> Htmx {
        let mut builder = Request::builder().uri("/cart/update");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        Htmx::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_plain_request() {
        let htmx = extract(&[]).await;
        assert!(!htmx.is_request);
        assert_eq!(htmx.active_view(View::Cart), View::Cart);
    }

    #[tokio::test]
    async fn test_current_url_wins_over_referer() {
        let htmx = extract(&[
            ("HX-Request", "true"),
            ("HX-Current-URL", "http://localhost:3000/checkout"),
            ("Referer", "http://localhost:3000/cart"),
        ])
        .await;
        assert!(htmx.is_request);
        assert_eq!(htmx.origin, Some(View::Checkout));
    }

    #[tokio::test]
    async fn test_referer_fallback() {
        let htmx = extract(&[("Referer", "http://localhost:3000/")]).await;
        assert_eq!(htmx.active_view(View::Cart), View::Catalog);
    }
}
