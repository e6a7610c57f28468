//! Integration tests for cartstore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartstore-integration-tests
//! ```
//!
//! Tests drive the storefront router in-process with an in-memory session
//! store, so no server or database is needed. [`TestClient`] carries the
//! session cookie between requests like a browser would, and [`FlakyStore`]
//! stands in for a session backend that starts failing.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use cartstore_core::{Price, ProductId};
use cartstore_storefront::catalog::{Catalog, CatalogProduct};
use cartstore_storefront::config::StorefrontConfig;
use cartstore_storefront::middleware::create_session_layer;
use cartstore_storefront::routes;
use cartstore_storefront::state::AppState;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a header as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Where a form post claims to come from.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// A plain browser form post with no origin headers.
    Plain,
    /// An htmx request issued from the given page path.
    Htmx(&'a str),
}

/// A storefront plus one visitor's cookie jar.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Storefront with the default configuration and the given catalog.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration is invalid.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_store(catalog, MemoryStore::default())
    }

    /// Storefront backed by a specific session store.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration is invalid.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_store<Store>(catalog: Catalog, store: Store) -> Self
    where
        Store: SessionStore + Clone,
    {
        let config =
            StorefrontConfig::from_lookup(|_| None).expect("default configuration is valid");
        let session_layer = create_session_layer(store, &config);
        let state = AppState::new(config, catalog, None);
        Self {
            router: routes::app(state, session_layer),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, with no session yet.
    #[must_use]
    pub fn fresh_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Send a request, attaching and then updating the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body is not UTF-8.
    #[allow(clippy::expect_used)]
    pub async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("cookie is a valid header value"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            self.cookie = set_cookie.split(';').next().map(str::to_owned);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let body = String::from_utf8(bytes.to_vec()).expect("body is UTF-8");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET path`.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid URI.
    #[allow(clippy::expect_used)]
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// `POST path` with a urlencoded form body.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid URI.
    #[allow(clippy::expect_used)]
    pub async fn post_form(&mut self, path: &str, form: &str, origin: Origin<'_>) -> TestResponse {
        let mut builder = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Origin::Htmx(page) = origin {
            builder = builder
                .header("HX-Request", "true")
                .header("HX-Current-URL", format!("http://localhost:3000{page}"));
        }
        let request = builder
            .body(Body::from(form.to_owned()))
            .expect("valid request");
        self.send(request).await
    }

    /// Add one unit of a product the way the catalog form does.
    pub async fn add(&mut self, id: &str, name: &str, price: &str) -> TestResponse {
        let form = format!("id={id}&name={name}&price={price}&image=%2Fstatic%2Fimg%2F{id}.jpg");
        self.post_form("/cart/add", &form, Origin::Htmx("/")).await
    }
}

/// In-memory session store that can be told to fail upcoming operations.
///
/// Clones share their counters, so a test keeps one handle and gives the
/// other to the storefront.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing_saves: Arc<AtomicUsize>,
    failing_loads: Arc<AtomicUsize>,
}

impl FlakyStore {
    /// Make the next `n` saves fail.
    pub fn fail_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` loads fail.
    pub fn fail_loads(&self, n: usize) {
        self.failing_loads.store(n, Ordering::SeqCst);
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        if Self::take(&self.failing_saves) {
            return Err(session_store::Error::Backend("disk full".to_string()));
        }
        self.inner.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        if Self::take(&self.failing_saves) {
            return Err(session_store::Error::Backend("disk full".to_string()));
        }
        self.inner.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        if Self::take(&self.failing_loads) {
            return Err(session_store::Error::Backend("connection reset".to_string()));
        }
        self.inner.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.inner.delete(session_id).await
    }
}

/// A small catalog for home page tests.
///
/// # Panics
///
/// Panics if a hard-coded price is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn sample_catalog() -> Catalog {
    Catalog::new(vec![
        CatalogProduct {
            id: ProductId::from("mug"),
            name: "Stoneware Mug".to_string(),
            price: Price::parse("14.00").expect("valid price"),
            image: "/static/img/mug.jpg".to_string(),
        },
        CatalogProduct {
            id: ProductId::from("tote"),
            name: "Canvas Tote".to_string(),
            price: Price::parse("22.50").expect("valid price"),
            image: String::new(),
        },
    ])
}
