//! HTTP middleware and extractors for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only, capture errors and transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Session layer (tower-sessions, memory or `PostgreSQL` store)
//!
//! # Extractors
//!
//! - [`SessionCart`] - the visitor's cart, loaded from the session slot
//! - [`Htmx`] - whether htmx sent the request and from which page

pub mod cart;
pub mod htmx;
pub mod request_id;
pub mod session;

pub use cart::{SessionCart, SessionSlot};
pub use htmx::{CART_UPDATED_EVENT, HX_CURRENT_URL, HX_REQUEST, HX_TRIGGER, Htmx};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
